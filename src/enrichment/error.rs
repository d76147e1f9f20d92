use thiserror::Error;

/// Batch-level failures. Per-item problems never surface here, they become
/// `EnrichmentOutcome::Failed` instead.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("Unknown enrichment job: {0}")]
    UnknownJob(String),

    #[error("batchSize must be between 1 and {max}, got {value}")]
    InvalidBatchSize { value: i64, max: usize },

    #[error("startFromIndex must not be negative, got {0}")]
    InvalidStartIndex(i64),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl EnrichmentError {
    /// Whether the request was rejected before any work started.
    pub fn is_request_error(&self) -> bool {
        !matches!(self, EnrichmentError::Store(_))
    }
}
