use serde::{Deserialize, Serialize};

/// Final status of an enrichment invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Completed,
    Failed,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Completed => "completed",
            AuditStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(AuditStatus::Completed),
            "failed" => Some(AuditStatus::Failed),
            _ => None,
        }
    }
}

/// A record to append to the enrichment audit log.
#[derive(Debug, Clone)]
pub struct NewAuditRecord {
    /// `enrich_<job kind>`
    pub action: String,
    pub status: AuditStatus,
    pub actor_id: String,
    pub request_snapshot: serde_json::Value,
    pub response_snapshot: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub duration_ms: i64,
}

/// A stored, immutable audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: i64,
    pub action: String,
    pub status: AuditStatus,
    pub actor_id: String,
    pub request_snapshot: serde_json::Value,
    pub response_snapshot: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub duration_ms: i64,
    /// Unix timestamp when the record was written
    pub timestamp: i64,
}
