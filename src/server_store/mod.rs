mod models;
mod schema;
mod sqlite_server_store;

pub use models::*;
pub use schema::SERVER_VERSIONED_SCHEMAS;
pub use sqlite_server_store::SqliteServerStore;

use anyhow::Result;

pub trait ServerStore: Send + Sync {
    /// Appends one audit record. Records are never updated afterwards.
    fn insert_audit_record(&self, record: &NewAuditRecord) -> Result<i64>;

    /// Most recent audit records first.
    fn list_audit_records(&self, limit: usize, offset: usize) -> Result<Vec<AuditRecord>>;
}
