//! Resolves catalog artists to registry identifiers by name.

use super::unavailable;
use crate::catalog_store::{Artist, ArtistPredicate};
use crate::enrichment::job::{EnrichmentJob, JobContext};
use crate::enrichment::models::{skip_reason, EnrichmentOutcome, JobKind};
use crate::providers::{best_match, ProviderResponse};
use async_trait::async_trait;
use tracing::debug;

pub struct ExternalIdJob;

const NO_MATCH: &str = "No matching artist found";

#[async_trait]
impl EnrichmentJob for ExternalIdJob {
    fn kind(&self) -> JobKind {
        JobKind::ExternalIds
    }

    // A resolved id is never replaced, so a forced run selects the same rows.
    fn predicate(&self, _force_refresh: bool) -> ArtistPredicate {
        ArtistPredicate::MissingExternalId
    }

    fn is_sufficient(&self, artist: &Artist) -> bool {
        artist.external_id.is_some()
    }

    fn requires_external_id(&self) -> bool {
        false
    }

    async fn enrich(&self, artist: &Artist, ctx: &JobContext) -> anyhow::Result<EnrichmentOutcome> {
        if artist.external_id.is_some() {
            return Ok(EnrichmentOutcome::skipped(skip_reason::SUFFICIENT));
        }

        let response = ctx.providers.search_artists(&artist.name).await;
        if let Some(failed) = unavailable(artist, ctx.providers.registry_name(), &response) {
            return Ok(failed);
        }
        let ProviderResponse::Found(candidates) = response else {
            return Ok(EnrichmentOutcome::failed(&artist.name, NO_MATCH));
        };

        let Some(candidate) = best_match(&artist.name, &candidates) else {
            return Ok(EnrichmentOutcome::failed(&artist.name, NO_MATCH));
        };

        debug!(
            "Matched {:?} to {} ({:?}, score {})",
            artist.name, candidate.id, candidate.name, candidate.score
        );

        if ctx.catalog.set_external_id(&artist.id, &candidate.id)? {
            Ok(EnrichmentOutcome::Successful(format!(
                "Resolved external id {}",
                candidate.id
            )))
        } else {
            Ok(EnrichmentOutcome::skipped(skip_reason::NO_NEW_DATA))
        }
    }
}
