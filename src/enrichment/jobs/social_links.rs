//! Fills empty social-link fields from the registry's URL relations.

use super::{external_id, unavailable};
use crate::catalog_store::{Artist, ArtistPredicate};
use crate::enrichment::job::{EnrichmentJob, JobContext};
use crate::enrichment::models::{skip_reason, EnrichmentOutcome, JobKind};
use crate::providers::{extract_social_links, ProviderResponse};
use async_trait::async_trait;
use tracing::debug;

pub struct SocialLinksJob;

#[async_trait]
impl EnrichmentJob for SocialLinksJob {
    fn kind(&self) -> JobKind {
        JobKind::SocialLinks
    }

    fn predicate(&self, force_refresh: bool) -> ArtistPredicate {
        if force_refresh {
            ArtistPredicate::HasExternalId
        } else {
            ArtistPredicate::MissingSocialLinks
        }
    }

    fn is_sufficient(&self, artist: &Artist) -> bool {
        artist.social_links().is_complete()
    }

    async fn enrich(&self, artist: &Artist, ctx: &JobContext) -> anyhow::Result<EnrichmentOutcome> {
        let response = ctx.providers.artist_relations(external_id(artist)?).await;
        if let Some(failed) = unavailable(artist, ctx.providers.registry_name(), &response) {
            return Ok(failed);
        }
        let ProviderResponse::Found(relations) = response else {
            return Ok(EnrichmentOutcome::failed(&artist.name, "No registry entry found"));
        };

        // Populated fields are never overwritten, forced or not.
        let gaps = extract_social_links(&relations).gaps_filled_by(&artist.social_links());
        if gaps.is_empty() {
            return Ok(EnrichmentOutcome::skipped(skip_reason::NO_NEW_DATA));
        }

        let written = ctx.catalog.fill_social_links(&artist.id, &gaps)?;
        if written == 0 {
            return Ok(EnrichmentOutcome::skipped(skip_reason::NO_NEW_DATA));
        }

        debug!("Filled {} social link fields for {}", written, artist.id);
        Ok(EnrichmentOutcome::Successful(format!(
            "Filled {} social link field(s)",
            written
        )))
    }
}
