//! Audit logging for enrichment invocations.

use super::models::JobKind;
use crate::server_store::{AuditStatus, NewAuditRecord, ServerStore};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Writes the single audit record of one invocation.
///
/// Writes are best-effort: a failing audit store is logged and never changes
/// the result returned to the caller.
pub struct EnrichmentAuditLogger {
    server_store: Arc<dyn ServerStore>,
    action: &'static str,
    actor_id: String,
    request_snapshot: serde_json::Value,
    start_time: Instant,
}

impl EnrichmentAuditLogger {
    pub fn new(
        server_store: Arc<dyn ServerStore>,
        job: JobKind,
        actor_id: &str,
        request_snapshot: serde_json::Value,
    ) -> Self {
        Self {
            server_store,
            action: job.action(),
            actor_id: actor_id.to_string(),
            request_snapshot,
            start_time: Instant::now(),
        }
    }

    pub fn log_completed(self, response: serde_json::Value) {
        self.write(AuditStatus::Completed, Some(response), None);
    }

    pub fn log_failed(self, error: &str) {
        self.write(AuditStatus::Failed, None, Some(error.to_string()));
    }

    pub fn elapsed_ms(&self) -> i64 {
        self.start_time.elapsed().as_millis() as i64
    }

    fn write(
        self,
        status: AuditStatus,
        response_snapshot: Option<serde_json::Value>,
        error_message: Option<String>,
    ) {
        let record = NewAuditRecord {
            action: self.action.to_string(),
            status,
            actor_id: self.actor_id.clone(),
            request_snapshot: self.request_snapshot.clone(),
            response_snapshot,
            error_message,
            duration_ms: self.elapsed_ms(),
        };
        if let Err(e) = self.server_store.insert_audit_record(&record) {
            warn!("Failed to write audit record for {}: {}", self.action, e);
        }
    }
}
