//! CatalogStore trait definition.
//!
//! The enrichment pipeline reaches the catalog only through this trait, so
//! jobs can run against the SQLite store or an in-memory fake.

use super::models::{Artist, ArtistPredicate, NewRelease, Release, SocialLinks};
use anyhow::Result;

pub trait CatalogStore: Send + Sync {
    // =========================================================================
    // Selection
    // =========================================================================

    /// Artists matching `predicate`, ordered by name (case-insensitive) then id,
    /// sliced to `[offset, offset + limit)`.
    fn select_artists(
        &self,
        predicate: &ArtistPredicate,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Artist>>;

    /// Number of artists matching `predicate`.
    fn count_artists(&self, predicate: &ArtistPredicate) -> Result<usize>;

    /// How many of `ids` still match `predicate`.
    fn count_artists_among(&self, predicate: &ArtistPredicate, ids: &[String]) -> Result<usize>;

    fn get_artist(&self, id: &str) -> Result<Option<Artist>>;

    fn insert_artist(&self, artist: &Artist) -> Result<()>;

    // =========================================================================
    // Enrichment writes
    // =========================================================================

    /// Sets the external id only if the artist has none yet.
    /// Returns whether a row was changed.
    fn set_external_id(&self, artist_id: &str, external_id: &str) -> Result<bool>;

    /// Overwrites the biography and records which provider wrote it.
    fn set_biography(&self, artist_id: &str, biography: &str, source: &str) -> Result<()>;

    /// Writes each provided link only into a slot that is currently empty.
    /// Returns the number of fields written.
    fn fill_social_links(&self, artist_id: &str, links: &SocialLinks) -> Result<usize>;

    /// Replaces every release (and track) of the artist and marks it as having
    /// tracks, atomically.
    fn replace_releases(&self, artist_id: &str, releases: &[NewRelease]) -> Result<()>;

    fn get_releases(&self, artist_id: &str) -> Result<Vec<Release>>;
}
