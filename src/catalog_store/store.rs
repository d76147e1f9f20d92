//! SQLite-backed catalog store.

use super::models::*;
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::trait_def::CatalogStore;
use crate::sqlite_persistence::open_versioned;
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

const ARTIST_COLUMNS: &str = "id, name, external_id, biography, instagram_handle, \
    twitter_handle, homepage_url, has_tracks, enriched_at, biography_source";

#[derive(Clone)]
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

impl SqliteCatalogStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned(db_path.as_ref(), CATALOG_VERSIONED_SCHEMAS, "catalog")?;

        let artist_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM artists", [], |r| r.get(0))
            .unwrap_or(0);
        info!("Opened catalog: {} artists", artist_count);

        Ok(SqliteCatalogStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// A poisoned lock surfaces as a store error instead of a second panic.
    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Catalog connection lock poisoned"))
    }

    fn parse_artist_row(row: &rusqlite::Row) -> rusqlite::Result<Artist> {
        Ok(Artist {
            id: row.get(0)?,
            name: row.get(1)?,
            external_id: row.get(2)?,
            biography: row.get(3)?,
            instagram_handle: row.get(4)?,
            twitter_handle: row.get(5)?,
            homepage_url: row.get(6)?,
            has_tracks: row.get::<_, i64>(7)? != 0,
            enriched_at: row.get(8)?,
            biography_source: row.get(9)?,
        })
    }

    fn get_tracks(conn: &Connection, release_id: i64) -> Result<Vec<Track>> {
        let mut stmt = conn.prepare_cached(
            "SELECT id, release_id, title, position, duration_ms FROM tracks
             WHERE release_id = ?1 ORDER BY position, id",
        )?;
        let tracks = stmt
            .query_map(params![release_id], |row| {
                Ok(Track {
                    id: row.get(0)?,
                    release_id: row.get(1)?,
                    title: row.get(2)?,
                    position: row.get::<_, i64>(3)? as u32,
                    duration_ms: row.get::<_, Option<i64>>(4)?.map(|d| d as u64),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tracks)
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn select_artists(
        &self,
        predicate: &ArtistPredicate,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Artist>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM artists WHERE {} ORDER BY name COLLATE NOCASE, id LIMIT ?1 OFFSET ?2",
            ARTIST_COLUMNS,
            predicate.where_clause()
        );
        let mut stmt = conn.prepare(&sql)?;
        let artists = stmt
            .query_map(
                params![limit as i64, offset as i64],
                Self::parse_artist_row,
            )?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read artists")?;
        Ok(artists)
    }

    fn count_artists(&self, predicate: &ArtistPredicate) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM artists WHERE {}",
                predicate.where_clause()
            ),
            [],
            |r| r.get(0),
        )?;
        Ok(count as usize)
    }

    fn count_artists_among(&self, predicate: &ArtistPredicate, ids: &[String]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let conn = self.conn()?;
        let placeholders = vec!["?"; ids.len()].join(", ");
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM artists WHERE ({}) AND id IN ({})",
                predicate.where_clause(),
                placeholders
            ),
            params_from_iter(ids.iter()),
            |r| r.get(0),
        )?;
        Ok(count as usize)
    }

    fn get_artist(&self, id: &str) -> Result<Option<Artist>> {
        let conn = self.conn()?;
        let artist = conn
            .query_row(
                &format!("SELECT {} FROM artists WHERE id = ?1", ARTIST_COLUMNS),
                params![id],
                Self::parse_artist_row,
            )
            .optional()?;
        Ok(artist)
    }

    fn insert_artist(&self, artist: &Artist) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO artists ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                ARTIST_COLUMNS
            ),
            params![
                artist.id,
                artist.name,
                artist.external_id,
                artist.biography,
                artist.instagram_handle,
                artist.twitter_handle,
                artist.homepage_url,
                artist.has_tracks as i64,
                artist.enriched_at,
                artist.biography_source,
            ],
        )
        .with_context(|| format!("Failed to insert artist {}", artist.id))?;
        Ok(())
    }

    fn set_external_id(&self, artist_id: &str, external_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE artists SET external_id = ?1, enriched_at = ?2
             WHERE id = ?3 AND external_id IS NULL",
            params![external_id, now_secs(), artist_id],
        )?;
        Ok(changed > 0)
    }

    fn set_biography(&self, artist_id: &str, biography: &str, source: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE artists SET biography = ?1, biography_source = ?2, enriched_at = ?3
             WHERE id = ?4",
            params![biography, source, now_secs(), artist_id],
        )?;
        Ok(())
    }

    fn fill_social_links(&self, artist_id: &str, links: &SocialLinks) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let current = tx
            .query_row(
                "SELECT instagram_handle, twitter_handle, homepage_url FROM artists WHERE id = ?1",
                params![artist_id],
                |row| {
                    Ok(SocialLinks {
                        instagram_handle: row.get(0)?,
                        twitter_handle: row.get(1)?,
                        homepage_url: row.get(2)?,
                    })
                },
            )
            .optional()?
            .with_context(|| format!("Artist {} not found", artist_id))?;

        let gaps = links.gaps_filled_by(&current);
        let written = [
            &gaps.instagram_handle,
            &gaps.twitter_handle,
            &gaps.homepage_url,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count();

        if written > 0 {
            tx.execute(
                "UPDATE artists SET
                    instagram_handle = CASE WHEN instagram_handle IS NULL OR instagram_handle = ''
                        THEN COALESCE(?1, instagram_handle) ELSE instagram_handle END,
                    twitter_handle = CASE WHEN twitter_handle IS NULL OR twitter_handle = ''
                        THEN COALESCE(?2, twitter_handle) ELSE twitter_handle END,
                    homepage_url = CASE WHEN homepage_url IS NULL OR homepage_url = ''
                        THEN COALESCE(?3, homepage_url) ELSE homepage_url END,
                    enriched_at = ?4
                 WHERE id = ?5",
                params![
                    gaps.instagram_handle,
                    gaps.twitter_handle,
                    gaps.homepage_url,
                    now_secs(),
                    artist_id
                ],
            )?;
        }
        tx.commit()?;
        Ok(written)
    }

    fn replace_releases(&self, artist_id: &str, releases: &[NewRelease]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM tracks WHERE release_id IN (SELECT id FROM releases WHERE artist_id = ?1)",
            params![artist_id],
        )?;
        tx.execute(
            "DELETE FROM releases WHERE artist_id = ?1",
            params![artist_id],
        )?;

        for release in releases {
            let inserted = tx.execute(
                "INSERT INTO releases (artist_id, external_id, title, release_date)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(artist_id, external_id) DO NOTHING",
                params![
                    artist_id,
                    release.external_id,
                    release.title,
                    release.release_date
                ],
            )?;
            if inserted == 0 {
                debug!(
                    "Skipping duplicate release {} for artist {}",
                    release.external_id, artist_id
                );
                continue;
            }
            let release_id = tx.last_insert_rowid();
            for track in &release.tracks {
                tx.execute(
                    "INSERT INTO tracks (release_id, title, position, duration_ms)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        release_id,
                        track.title,
                        track.position as i64,
                        track.duration_ms.map(|d| d as i64)
                    ],
                )?;
            }
        }

        tx.execute(
            "UPDATE artists SET has_tracks = 1, enriched_at = ?1 WHERE id = ?2",
            params![now_secs(), artist_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn get_releases(&self, artist_id: &str) -> Result<Vec<Release>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, artist_id, external_id, title, release_date FROM releases
             WHERE artist_id = ?1 ORDER BY id",
        )?;
        let mut releases = stmt
            .query_map(params![artist_id], |row| {
                Ok(Release {
                    id: row.get(0)?,
                    artist_id: row.get(1)?,
                    external_id: row.get(2)?,
                    title: row.get(3)?,
                    release_date: row.get(4)?,
                    tracks: Vec::new(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for release in releases.iter_mut() {
            release.tracks = Self::get_tracks(&conn, release.id)?;
        }
        Ok(releases)
    }
}
