use super::error::EnrichmentError;
use crate::config::EnrichmentSettings;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The enrichment jobs the server knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    ExternalIds,
    Biographies,
    SocialLinks,
    Tracks,
}

impl JobKind {
    pub const ALL: [JobKind; 4] = [
        JobKind::ExternalIds,
        JobKind::Biographies,
        JobKind::SocialLinks,
        JobKind::Tracks,
    ];

    /// Path segment used by the admin endpoints.
    pub fn slug(&self) -> &'static str {
        match self {
            JobKind::ExternalIds => "external-ids",
            JobKind::Biographies => "biographies",
            JobKind::SocialLinks => "social-links",
            JobKind::Tracks => "tracks",
        }
    }

    /// Action name written to the audit log.
    pub fn action(&self) -> &'static str {
        match self {
            JobKind::ExternalIds => "enrich_external_ids",
            JobKind::Biographies => "enrich_biographies",
            JobKind::SocialLinks => "enrich_social_links",
            JobKind::Tracks => "enrich_tracks",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Request body of a batch invocation, every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequestBody {
    pub batch_size: Option<i64>,
    pub start_from_index: Option<i64>,
    pub force_refresh: Option<bool>,
}

/// A validated batch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub batch_size: usize,
    pub start_from_index: usize,
    pub force_refresh: bool,
}

impl BatchRequest {
    pub fn resolve(
        body: &BatchRequestBody,
        settings: &EnrichmentSettings,
    ) -> Result<Self, EnrichmentError> {
        let max = settings.max_batch_size;
        let batch_size = match body.batch_size {
            None => settings.default_batch_size,
            Some(value) if value >= 1 && (value as u64) <= max as u64 => value as usize,
            Some(value) => return Err(EnrichmentError::InvalidBatchSize { value, max }),
        };

        let start_from_index = match body.start_from_index {
            None => 0,
            Some(value) if value >= 0 => value as usize,
            Some(value) => return Err(EnrichmentError::InvalidStartIndex(value)),
        };

        Ok(Self {
            batch_size,
            start_from_index,
            force_refresh: body.force_refresh.unwrap_or(false),
        })
    }
}

/// What happened to one artist during a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    Skipped(String),
    Successful(String),
    Failed {
        entity_name: String,
        error_message: String,
    },
}

impl EnrichmentOutcome {
    pub fn skipped(reason: &str) -> Self {
        EnrichmentOutcome::Skipped(reason.to_string())
    }

    pub fn failed(entity_name: &str, error_message: impl Into<String>) -> Self {
        EnrichmentOutcome::Failed {
            entity_name: entity_name.to_string(),
            error_message: error_message.into(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EnrichmentOutcome::Skipped(_) => "skipped",
            EnrichmentOutcome::Successful(_) => "successful",
            EnrichmentOutcome::Failed { .. } => "failed",
        }
    }
}

/// Skip reasons shared by every job.
pub mod skip_reason {
    pub const SUFFICIENT: &str = "sufficient";
    pub const MISSING_PREREQUISITE: &str = "missing prerequisite key";
    pub const NO_NEW_DATA: &str = "no new data";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemError {
    pub entity_name: String,
    pub error_message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub percentage: u32,
}

impl Progress {
    /// Percentage is rounded and capped at 100; an empty total counts as done.
    pub fn new(current: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            100
        } else {
            let pct = (current as f64 / total as f64 * 100.0).round();
            pct.min(100.0) as u32
        };
        Self {
            current,
            total,
            percentage,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: Vec<ItemError>,
    pub progress: Progress,
    pub completed: bool,
}

/// Everything a finished batch hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutput {
    pub report: BatchReport,
    /// Entities still matching the job predicate past `next_index`.
    pub remaining: usize,
    pub next_index: usize,
}
