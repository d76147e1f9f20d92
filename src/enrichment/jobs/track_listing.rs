//! Replaces an artist's releases and tracks with the registry's listing.

use super::{external_id, unavailable};
use crate::catalog_store::{Artist, ArtistPredicate};
use crate::enrichment::job::{EnrichmentJob, JobContext};
use crate::enrichment::models::{EnrichmentOutcome, JobKind};
use crate::providers::ProviderResponse;
use async_trait::async_trait;
use tracing::debug;

pub struct TrackListingJob;

#[async_trait]
impl EnrichmentJob for TrackListingJob {
    fn kind(&self) -> JobKind {
        JobKind::Tracks
    }

    fn predicate(&self, force_refresh: bool) -> ArtistPredicate {
        if force_refresh {
            ArtistPredicate::HasExternalId
        } else {
            ArtistPredicate::MissingTracks
        }
    }

    fn is_sufficient(&self, artist: &Artist) -> bool {
        artist.has_tracks
    }

    async fn enrich(&self, artist: &Artist, ctx: &JobContext) -> anyhow::Result<EnrichmentOutcome> {
        let response = ctx.providers.releases(external_id(artist)?).await;
        if let Some(failed) = unavailable(artist, ctx.providers.releases_name(), &response) {
            return Ok(failed);
        }
        let ProviderResponse::Found(releases) = response else {
            return Ok(EnrichmentOutcome::failed(&artist.name, "No releases found"));
        };

        ctx.catalog.replace_releases(&artist.id, &releases)?;

        let track_count: usize = releases.iter().map(|r| r.tracks.len()).sum();
        debug!(
            "Stored {} releases ({} tracks) for {}",
            releases.len(),
            track_count,
            artist.id
        );
        Ok(EnrichmentOutcome::Successful(format!(
            "Stored {} releases with {} tracks",
            releases.len(),
            track_count
        )))
    }
}
