//! Admin enrichment HTTP routes.
//!
//! Provides endpoints for:
//! - Running one batch of an enrichment job
//! - Counting what a job still has to do
//! - Reading the enrichment audit log

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

use crate::enrichment::{BatchReport, BatchRequestBody, EnrichmentError};
use crate::server::metrics::record_error;
use crate::server::session::Session;
use crate::server::state::{GuardedEnrichmentService, ServerState};
use crate::server_store::AuditRecord;
use crate::user::Permission;

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub success: bool,
    pub results: BatchReport,
    pub completed: bool,
    pub remaining: usize,
    pub next_index: usize,
    pub execution_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job: String,
    pub remaining: usize,
}

#[derive(Debug, Serialize)]
pub struct AuditLogResponse {
    pub records: Vec<AuditRecord>,
}

#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

const MAX_AUDIT_PAGE: usize = 500;

// =============================================================================
// Errors
// =============================================================================

/// Failure answer of every enrichment endpoint: `{success: false, error}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Forbidden,
    NotFound(String),
    Internal(String),
}

impl From<EnrichmentError> for ApiError {
    fn from(e: EnrichmentError) -> Self {
        match e {
            EnrichmentError::UnknownJob(_) => ApiError::NotFound(e.to_string()),
            EnrichmentError::InvalidBatchSize { .. } | EnrichmentError::InvalidStartIndex(_) => {
                ApiError::BadRequest(e.to_string())
            }
            EnrichmentError::Store(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

fn require(session: &Session, permission: Permission) -> Result<(), ApiError> {
    if session.has_permission(permission) {
        Ok(())
    } else {
        warn!(
            "user_id={} lacks {:?} for enrichment endpoint",
            session.user_id, permission
        );
        Err(ApiError::Forbidden)
    }
}

fn parse_body(body: &[u8]) -> Result<BatchRequestBody, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(BatchRequestBody::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid body: {}", e)))
}

// =============================================================================
// Admin Routes
// =============================================================================

/// POST /{job} - Run one batch of the job
async fn run_batch(
    session: Session,
    State(service): State<GuardedEnrichmentService>,
    Path(job): Path<String>,
    body: Bytes,
) -> Result<Json<BatchResponse>, ApiError> {
    require(&session, Permission::RunEnrichment)?;
    let body = parse_body(&body)?;

    let execution = service
        .run_batch(&job, &body, &session.user_id.to_string())
        .await
        .map_err(|e| {
            if !e.is_request_error() {
                error!("Enrichment batch {} failed: {}", job, e);
                record_error("enrichment_batch", &job);
            }
            ApiError::from(e)
        })?;

    let output = execution.output;
    Ok(Json(BatchResponse {
        success: true,
        completed: output.report.completed,
        results: output.report,
        remaining: output.remaining,
        next_index: output.next_index,
        execution_time_ms: execution.execution_time_ms,
    }))
}

/// GET /{job}/status - How many artists the job still has to visit
async fn job_status(
    session: Session,
    State(service): State<GuardedEnrichmentService>,
    Path(job): Path<String>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    require(&session, Permission::ViewAuditLog)?;
    let (kind, remaining) = service.remaining(&job)?;
    Ok(Json(JobStatusResponse {
        job: kind.slug().to_string(),
        remaining,
    }))
}

/// GET /audit - Most recent audit records first
async fn audit_log(
    session: Session,
    State(service): State<GuardedEnrichmentService>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<AuditLogResponse>, ApiError> {
    require(&session, Permission::ViewAuditLog)?;
    let records = service.audit_log(query.limit.min(MAX_AUDIT_PAGE), query.offset)?;
    Ok(Json(AuditLogResponse { records }))
}

pub fn enrichment_routes() -> Router<ServerState> {
    Router::new()
        .route("/audit", get(audit_log))
        .route("/{job}", post(run_batch))
        .route("/{job}/status", get(job_status))
}
