//! The concrete enrichment jobs.

mod biography;
mod resolve_ids;
mod social_links;
mod track_listing;

pub use biography::BiographyJob;
pub use resolve_ids::ExternalIdJob;
pub use social_links::SocialLinksJob;
pub use track_listing::TrackListingJob;

use super::job::EnrichmentJob;
use super::models::EnrichmentOutcome;
use crate::catalog_store::Artist;
use crate::config::EnrichmentSettings;
use crate::providers::ProviderResponse;
use std::sync::Arc;

/// Every job, one per `JobKind`.
pub fn all_jobs(settings: &EnrichmentSettings) -> Vec<Arc<dyn EnrichmentJob>> {
    vec![
        Arc::new(ExternalIdJob),
        Arc::new(BiographyJob::new(settings.biography_min_length)),
        Arc::new(SocialLinksJob),
        Arc::new(TrackListingJob),
    ]
}

/// Failed outcome for a provider call that neither found nor ruled out data.
/// Returns `None` for `Found` and `NotFound`, which the jobs handle themselves.
fn unavailable<T>(
    artist: &Artist,
    provider: &str,
    response: &ProviderResponse<T>,
) -> Option<EnrichmentOutcome> {
    let message = match response {
        ProviderResponse::RateLimited(_) => format!("Rate limited by {}", provider),
        ProviderResponse::TransientError(msg) => format!("{} error: {}", provider, msg),
        ProviderResponse::Found(_) | ProviderResponse::NotFound => return None,
    };
    Some(EnrichmentOutcome::failed(&artist.name, message))
}

/// The external id the worker already checked for.
fn external_id(artist: &Artist) -> anyhow::Result<&str> {
    artist
        .external_id
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("artist {} has no external id", artist.id))
}
