//! SQLite schema definitions for the catalog database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, ForeignKey, SqlType, Table, VersionedSchema};

// =============================================================================
// Version 1 - Artists
// =============================================================================

const ARTISTS_TABLE_V1: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("external_id", &SqlType::Text),
        sqlite_column!("biography", &SqlType::Text),
        sqlite_column!("instagram_handle", &SqlType::Text),
        sqlite_column!("twitter_handle", &SqlType::Text),
        sqlite_column!("homepage_url", &SqlType::Text),
    ],
    indices: &[
        ("idx_artists_name", "name COLLATE NOCASE, id"),
        ("idx_artists_external_id", "external_id"),
    ],
    unique_constraints: &[],
};

// =============================================================================
// Version 2 - Releases, tracks and enrichment markers
// =============================================================================

const ARTISTS_TABLE_V2: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("external_id", &SqlType::Text),
        sqlite_column!("biography", &SqlType::Text),
        sqlite_column!("instagram_handle", &SqlType::Text),
        sqlite_column!("twitter_handle", &SqlType::Text),
        sqlite_column!("homepage_url", &SqlType::Text),
        sqlite_column!(
            "has_tracks",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("enriched_at", &SqlType::Integer),
    ],
    indices: &[
        ("idx_artists_name", "name COLLATE NOCASE, id"),
        ("idx_artists_external_id", "external_id"),
    ],
    unique_constraints: &[],
};

const RELEASES_TABLE_V2: Table = Table {
    name: "releases",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "artist_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "artists",
                foreign_column: "id",
                cascade_delete: true,
            })
        ),
        sqlite_column!("external_id", &SqlType::Text, non_null = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("release_date", &SqlType::Text),
    ],
    indices: &[("idx_releases_artist", "artist_id")],
    unique_constraints: &[&["artist_id", "external_id"]],
};

const TRACKS_TABLE_V2: Table = Table {
    name: "tracks",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "release_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "releases",
                foreign_column: "id",
                cascade_delete: true,
            })
        ),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("position", &SqlType::Integer, non_null = true),
        sqlite_column!("duration_ms", &SqlType::Integer),
    ],
    indices: &[("idx_tracks_release", "release_id")],
    unique_constraints: &[],
};

fn migrate_v1_to_v2(conn: &rusqlite::Connection) -> anyhow::Result<()> {
    conn.execute(
        "ALTER TABLE artists ADD COLUMN has_tracks INTEGER NOT NULL DEFAULT 0",
        [],
    )?;
    conn.execute("ALTER TABLE artists ADD COLUMN enriched_at INTEGER", [])?;
    RELEASES_TABLE_V2.create(conn)?;
    TRACKS_TABLE_V2.create(conn)?;
    Ok(())
}

// =============================================================================
// Version 3 - Biography provenance
// =============================================================================

const ARTISTS_TABLE_V3: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("external_id", &SqlType::Text),
        sqlite_column!("biography", &SqlType::Text),
        sqlite_column!("instagram_handle", &SqlType::Text),
        sqlite_column!("twitter_handle", &SqlType::Text),
        sqlite_column!("homepage_url", &SqlType::Text),
        sqlite_column!(
            "has_tracks",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("enriched_at", &SqlType::Integer),
        // Provider that wrote the biography, NULL for curated text.
        sqlite_column!("biography_source", &SqlType::Text),
    ],
    indices: &[
        ("idx_artists_name", "name COLLATE NOCASE, id"),
        ("idx_artists_external_id", "external_id"),
    ],
    unique_constraints: &[],
};

fn migrate_v2_to_v3(conn: &rusqlite::Connection) -> anyhow::Result<()> {
    conn.execute("ALTER TABLE artists ADD COLUMN biography_source TEXT", [])?;
    Ok(())
}

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 1,
        tables: &[ARTISTS_TABLE_V1],
        migration: None,
    },
    VersionedSchema {
        version: 2,
        tables: &[ARTISTS_TABLE_V2, RELEASES_TABLE_V2, TRACKS_TABLE_V2],
        migration: Some(migrate_v1_to_v2),
    },
    VersionedSchema {
        version: 3,
        tables: &[ARTISTS_TABLE_V3, RELEASES_TABLE_V2, TRACKS_TABLE_V2],
        migration: Some(migrate_v2_to_v3),
    },
];
