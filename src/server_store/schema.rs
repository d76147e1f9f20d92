//! SQLite schema definitions for the server database.
//!
//! The server database holds state owned by the server itself rather than the
//! catalog, currently the append-only enrichment audit log.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};

// =============================================================================
// Version 1 - Enrichment audit log
// =============================================================================

const ENRICHMENT_AUDIT_LOG_TABLE_V1: Table = Table {
    name: "enrichment_audit_log",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("action", &SqlType::Text, non_null = true),
        sqlite_column!("status", &SqlType::Text, non_null = true),
        sqlite_column!("actor_id", &SqlType::Text, non_null = true),
        sqlite_column!("request_snapshot", &SqlType::Text, non_null = true),
        sqlite_column!("response_snapshot", &SqlType::Text),
        sqlite_column!("error_message", &SqlType::Text),
        sqlite_column!("duration_ms", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "timestamp",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_enrichment_audit_log_timestamp", "timestamp DESC"),
        ("idx_enrichment_audit_log_action", "action"),
    ],
    unique_constraints: &[],
};

pub const SERVER_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[ENRICHMENT_AUDIT_LOG_TABLE_V1],
    migration: None,
}];
