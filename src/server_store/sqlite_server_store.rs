use super::models::{AuditRecord, AuditStatus, NewAuditRecord};
use super::schema::SERVER_VERSIONED_SCHEMAS;
use super::ServerStore;
use crate::sqlite_persistence::open_versioned;
use anyhow::Result;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub struct SqliteServerStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteServerStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned(db_path.as_ref(), SERVER_VERSIONED_SCHEMAS, "server")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn parse_json(raw: Option<String>) -> Option<serde_json::Value> {
        raw.and_then(|s| serde_json::from_str(&s).ok())
    }

    fn row_to_audit_record(row: &rusqlite::Row) -> rusqlite::Result<AuditRecord> {
        let status_str: String = row.get(2)?;
        let request_raw: String = row.get(4)?;
        Ok(AuditRecord {
            id: row.get(0)?,
            action: row.get(1)?,
            status: AuditStatus::parse(&status_str).unwrap_or(AuditStatus::Failed),
            actor_id: row.get(3)?,
            request_snapshot: serde_json::from_str(&request_raw)
                .unwrap_or(serde_json::Value::Null),
            response_snapshot: Self::parse_json(row.get(5)?),
            error_message: row.get(6)?,
            duration_ms: row.get(7)?,
            timestamp: row.get(8)?,
        })
    }
}

impl ServerStore for SqliteServerStore {
    fn insert_audit_record(&self, record: &NewAuditRecord) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO enrichment_audit_log
                (action, status, actor_id, request_snapshot, response_snapshot, error_message, duration_ms, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.action,
                record.status.as_str(),
                record.actor_id,
                record.request_snapshot.to_string(),
                record.response_snapshot.as_ref().map(|v| v.to_string()),
                record.error_message,
                record.duration_ms,
                chrono::Utc::now().timestamp(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn list_audit_records(&self, limit: usize, offset: usize) -> Result<Vec<AuditRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, action, status, actor_id, request_snapshot, response_snapshot,
                    error_message, duration_ms, timestamp
             FROM enrichment_audit_log
             ORDER BY timestamp DESC, id DESC
             LIMIT ?1 OFFSET ?2",
        )?;

        let records = stmt
            .query_map(
                params![limit as i64, offset as i64],
                Self::row_to_audit_record,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }
}
