//! Per-item processing: skip checks, then the job itself, with every error
//! and panic folded into a `Failed` outcome.

use super::job::{EnrichmentJob, JobContext};
use super::models::{skip_reason, EnrichmentOutcome};
use crate::catalog_store::Artist;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

pub async fn process_item(
    job: &dyn EnrichmentJob,
    artist: &Artist,
    force_refresh: bool,
    ctx: &JobContext,
) -> EnrichmentOutcome {
    if !force_refresh && job.is_sufficient(artist) {
        debug!("{}: {} already sufficient", job.kind(), artist.id);
        return EnrichmentOutcome::skipped(skip_reason::SUFFICIENT);
    }

    if job.requires_external_id() && artist.external_id.is_none() {
        debug!("{}: {} has no external id", job.kind(), artist.id);
        return EnrichmentOutcome::skipped(skip_reason::MISSING_PREREQUISITE);
    }

    match AssertUnwindSafe(job.enrich(artist, ctx)).catch_unwind().await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            warn!("{}: {} failed: {:#}", job.kind(), artist.id, e);
            EnrichmentOutcome::failed(&artist.name, format!("{:#}", e))
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            warn!("{}: {} panicked: {}", job.kind(), artist.id, message);
            EnrichmentOutcome::failed(&artist.name, format!("Unexpected error: {}", message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
