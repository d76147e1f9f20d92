//! Fills short or missing biographies from the encyclopedia summary, optionally
//! rewritten by the text rewriter.

use super::{external_id, unavailable};
use crate::catalog_store::{Artist, ArtistPredicate};
use crate::enrichment::job::{EnrichmentJob, JobContext};
use crate::enrichment::models::{skip_reason, EnrichmentOutcome, JobKind};
use crate::providers::{wikipedia_title, ProviderResponse};
use async_trait::async_trait;
use tracing::{debug, warn};

pub struct BiographyJob {
    min_length: usize,
}

impl BiographyJob {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Page title from the registry's wikipedia relation, or the artist name.
    async fn summary_title(&self, artist: &Artist, ctx: &JobContext) -> anyhow::Result<String> {
        let external_id = external_id(artist)?;
        match ctx.providers.artist_relations(external_id).await {
            ProviderResponse::Found(relations) => {
                Ok(wikipedia_title(&relations).unwrap_or_else(|| artist.name.clone()))
            }
            ProviderResponse::NotFound => Ok(artist.name.clone()),
            other => {
                warn!(
                    "Relations lookup for {} failed ({}), using artist name as title",
                    artist.id,
                    other.label()
                );
                Ok(artist.name.clone())
            }
        }
    }
}

#[async_trait]
impl EnrichmentJob for BiographyJob {
    fn kind(&self) -> JobKind {
        JobKind::Biographies
    }

    fn predicate(&self, force_refresh: bool) -> ArtistPredicate {
        if force_refresh {
            ArtistPredicate::HasExternalId
        } else {
            ArtistPredicate::ShortBiography {
                min_length: self.min_length,
            }
        }
    }

    fn is_sufficient(&self, artist: &Artist) -> bool {
        artist.biography_source.is_some() || artist.biography_len() >= self.min_length
    }

    async fn enrich(&self, artist: &Artist, ctx: &JobContext) -> anyhow::Result<EnrichmentOutcome> {
        let title = self.summary_title(artist, ctx).await?;

        let response = ctx.providers.summary(&title).await;
        if let Some(failed) = unavailable(artist, ctx.providers.summaries_name(), &response) {
            return Ok(failed);
        }
        let ProviderResponse::Found(summary) = response else {
            return Ok(EnrichmentOutcome::failed(&artist.name, "No summary found"));
        };

        let (biography, source) = match ctx.providers.rewrite_biography(&artist.name, &summary).await {
            None => (summary, ctx.providers.summaries_name()),
            Some(ProviderResponse::Found(text)) => {
                (text, ctx.providers.rewriter_name().unwrap_or("rewriter"))
            }
            Some(other) => {
                let rewriter = ctx.providers.rewriter_name().unwrap_or("rewriter");
                return Ok(unavailable(artist, rewriter, &other).unwrap_or_else(|| {
                    EnrichmentOutcome::failed(&artist.name, format!("{} returned no text", rewriter))
                }));
            }
        };

        if artist.biography.as_deref() == Some(biography.as_str()) {
            return Ok(EnrichmentOutcome::skipped(skip_reason::NO_NEW_DATA));
        }

        ctx.catalog.set_biography(&artist.id, &biography, source)?;
        debug!(
            "Stored biography for {} ({} chars, from {})",
            artist.id,
            biography.chars().count(),
            source
        );
        Ok(EnrichmentOutcome::Successful(format!(
            "Biography updated from {:?}",
            title
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::CatalogStore;
    use crate::enrichment::test_support::*;

    fn wiki_relation() -> ProviderResponse<Vec<crate::providers::ArtistRelation>> {
        ProviderResponse::Found(vec![relation(
            "wikipedia",
            "https://en.wikipedia.org/wiki/Artist_B_(band)",
        )])
    }

    #[tokio::test]
    async fn stores_summary_found_through_wikipedia_relation() {
        let (_dir, catalog) = temp_catalog(&[artist_with_id("b1", "Artist B", "mb-b")]);
        let mut backend = FakeBackend::default();
        backend.relations.insert("mb-b".to_string(), wiki_relation());
        backend.summaries.insert(
            "Artist_B_(band)".to_string(),
            ProviderResponse::Found("Artist B is a band.".to_string()),
        );
        let (backend, providers) = backend.into_providers();
        let ctx = context(catalog.clone(), providers);

        let artist = catalog.get_artist("b1").unwrap().unwrap();
        let outcome = BiographyJob::new(2000).enrich(&artist, &ctx).await.unwrap();

        assert!(matches!(outcome, EnrichmentOutcome::Successful(_)));
        assert_eq!(backend.summary_titles(), vec!["Artist_B_(band)".to_string()]);
        let stored = catalog.get_artist("b1").unwrap().unwrap();
        assert_eq!(stored.biography.as_deref(), Some("Artist B is a band."));
        assert_eq!(stored.biography_source.as_deref(), Some("Summaries"));
    }

    #[tokio::test]
    async fn falls_back_to_artist_name_and_uses_rewriter() {
        let (_dir, catalog) = temp_catalog(&[artist_with_id("b1", "Artist B", "mb-b")]);
        let mut backend = FakeBackend::default();
        backend
            .relations
            .insert("mb-b".to_string(), ProviderResponse::TransientError("HTTP 500".to_string()));
        backend.summaries.insert(
            "Artist B".to_string(),
            ProviderResponse::Found("raw".to_string()),
        );
        backend.rewrite = Some(ProviderResponse::Found("polished".to_string()));
        let (backend, providers) = backend.into_providers();
        let ctx = context(catalog.clone(), providers);

        let artist = catalog.get_artist("b1").unwrap().unwrap();
        BiographyJob::new(2000).enrich(&artist, &ctx).await.unwrap();

        assert_eq!(backend.summary_titles(), vec!["Artist B".to_string()]);
        let stored = catalog.get_artist("b1").unwrap().unwrap();
        assert_eq!(stored.biography.as_deref(), Some("polished"));
        assert_eq!(stored.biography_source.as_deref(), Some("Rewriter"));
    }

    #[tokio::test]
    async fn missing_summary_fails_and_rewriter_error_fails() {
        let (_dir, catalog) = temp_catalog(&[artist_with_id("b1", "Artist B", "mb-b")]);
        let (_backend, providers) = FakeBackend::default().into_providers();
        let ctx = context(catalog.clone(), providers);
        let artist = catalog.get_artist("b1").unwrap().unwrap();

        let outcome = BiographyJob::new(2000).enrich(&artist, &ctx).await.unwrap();
        assert_eq!(outcome, EnrichmentOutcome::failed("Artist B", "No summary found"));

        let mut backend = FakeBackend::default();
        backend.summaries.insert(
            "Artist B".to_string(),
            ProviderResponse::Found("raw".to_string()),
        );
        backend.rewrite = Some(ProviderResponse::TransientError("timeout".to_string()));
        let (_backend, providers) = backend.into_providers();
        let ctx = context(catalog.clone(), providers);

        let outcome = BiographyJob::new(2000).enrich(&artist, &ctx).await.unwrap();
        assert_eq!(
            outcome,
            EnrichmentOutcome::failed("Artist B", "Rewriter error: timeout")
        );
        let stored = catalog.get_artist("b1").unwrap().unwrap();
        assert_eq!(stored.biography, None);
    }

    #[tokio::test]
    async fn identical_biography_is_no_new_data() {
        let mut artist = artist_with_id("b1", "Artist B", "mb-b");
        artist.biography = Some("same".to_string());
        let (_dir, catalog) = temp_catalog(&[artist.clone()]);
        let mut backend = FakeBackend::default();
        backend.summaries.insert(
            "Artist B".to_string(),
            ProviderResponse::Found("same".to_string()),
        );
        let (_backend, providers) = backend.into_providers();
        let ctx = context(catalog, providers);

        let outcome = BiographyJob::new(2000).enrich(&artist, &ctx).await.unwrap();
        assert_eq!(outcome, EnrichmentOutcome::skipped(skip_reason::NO_NEW_DATA));
    }

    #[test]
    fn sufficiency_uses_threshold() {
        let job = BiographyJob::new(10);
        let mut artist = Artist::new("b1", "Artist B");
        assert!(!job.is_sufficient(&artist));
        artist.biography = Some("x".repeat(10));
        assert!(job.is_sufficient(&artist));
        assert_eq!(job.predicate(true), ArtistPredicate::HasExternalId);
    }

    #[test]
    fn provider_written_biography_is_sufficient_at_any_length() {
        let job = BiographyJob::new(2000);
        let mut artist = artist_with_id("b1", "Artist B", "mb-b");
        artist.biography = Some("A short summary.".to_string());
        assert!(!job.is_sufficient(&artist));

        artist.biography_source = Some("Wikipedia".to_string());
        assert!(job.is_sufficient(&artist));
    }
}
