//! External metadata providers.
//!
//! Each adapter translates one service's request/response shape into a
//! `ProviderResponse`. Jobs reach adapters only through `ProviderSet`, which
//! paces every call and records the outcome in metrics.

mod http;
pub mod matching;
pub mod musicbrainz;
mod pacer;
pub mod relations;
pub mod rewriter;
pub mod wikipedia;

pub use matching::{best_match, normalize_name};
pub use musicbrainz::{MusicBrainzClient, MusicBrainzReleases};
pub use pacer::Pacer;
pub use relations::{extract_social_links, wikipedia_title};
pub use rewriter::{ApiKeySource, OpenAiRewriter};
pub use wikipedia::WikipediaClient;

use crate::catalog_store::NewRelease;
use crate::config::AppConfig;
use crate::server::metrics;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Normalized result of one provider call.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResponse<T> {
    Found(T),
    NotFound,
    RateLimited(Option<Duration>),
    TransientError(String),
}

impl<T> ProviderResponse<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ProviderResponse<U> {
        match self {
            ProviderResponse::Found(v) => ProviderResponse::Found(f(v)),
            ProviderResponse::NotFound => ProviderResponse::NotFound,
            ProviderResponse::RateLimited(d) => ProviderResponse::RateLimited(d),
            ProviderResponse::TransientError(e) => ProviderResponse::TransientError(e),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProviderResponse::Found(_) => "found",
            ProviderResponse::NotFound => "not_found",
            ProviderResponse::RateLimited(_) => "rate_limited",
            ProviderResponse::TransientError(_) => "error",
        }
    }
}

/// A registry search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistCandidate {
    pub id: String,
    pub name: String,
    /// Provider relevance, higher is better.
    pub score: u32,
    pub aliases: Vec<String>,
}

/// A typed external link attached to a registry artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistRelation {
    pub relation_type: String,
    pub url: String,
}

#[async_trait]
pub trait ArtistRegistry: Send + Sync {
    fn name(&self) -> &str;

    /// Candidates for `name`, in provider order.
    async fn search_artists(&self, name: &str) -> ProviderResponse<Vec<ArtistCandidate>>;

    async fn artist_relations(&self, external_id: &str) -> ProviderResponse<Vec<ArtistRelation>>;
}

#[async_trait]
pub trait SummaryProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Plain-text summary of the page with the given title.
    async fn summary(&self, title: &str) -> ProviderResponse<String>;
}

#[async_trait]
pub trait TextRewriter: Send + Sync {
    fn name(&self) -> &str;

    async fn rewrite_biography(&self, artist_name: &str, source: &str) -> ProviderResponse<String>;
}

#[async_trait]
pub trait ReleaseRegistry: Send + Sync {
    fn name(&self) -> &str;

    async fn releases(&self, external_id: &str) -> ProviderResponse<Vec<NewRelease>>;
}

/// Every provider the jobs use, each behind its own pacer.
pub struct ProviderSet {
    registry: Arc<dyn ArtistRegistry>,
    registry_pacer: Pacer,
    summaries: Arc<dyn SummaryProvider>,
    summaries_pacer: Pacer,
    rewriter: Option<(Arc<dyn TextRewriter>, Pacer)>,
    releases: Arc<dyn ReleaseRegistry>,
    releases_pacer: Pacer,
}

fn record<T>(provider: &str, response: &ProviderResponse<T>) {
    metrics::record_provider_response(provider, response.label());
}

impl ProviderSet {
    pub fn new(
        registry: Arc<dyn ArtistRegistry>,
        registry_pacer: Pacer,
        summaries: Arc<dyn SummaryProvider>,
        summaries_pacer: Pacer,
        rewriter: Option<(Arc<dyn TextRewriter>, Pacer)>,
        releases: Arc<dyn ReleaseRegistry>,
        releases_pacer: Pacer,
    ) -> Self {
        Self {
            registry,
            registry_pacer,
            summaries,
            summaries_pacer,
            rewriter,
            releases,
            releases_pacer,
        }
    }

    /// Builds the HTTP-backed providers from configuration.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let mb = &config.musicbrainz;
        let registry = Arc::new(MusicBrainzClient::new(
            &mb.base_url,
            &mb.user_agent,
            Duration::from_secs(mb.timeout_secs),
        )?);
        let releases = Arc::new(MusicBrainzReleases::new(registry.clone(), mb.releases_limit));

        let wiki = &config.wikipedia;
        let summaries = Arc::new(WikipediaClient::new(
            &wiki.base_url,
            &mb.user_agent,
            Duration::from_secs(wiki.timeout_secs),
        )?);

        let rewriter = match &config.llm {
            Some(llm) => {
                let source = match (&llm.api_key, &llm.api_key_command) {
                    (Some(key), _) => ApiKeySource::Static(key.clone()),
                    (None, Some(cmd)) => ApiKeySource::Command(cmd.clone()),
                    (None, None) => ApiKeySource::None,
                };
                let rewriter: Arc<dyn TextRewriter> = Arc::new(OpenAiRewriter::new(
                    &llm.base_url,
                    &llm.model,
                    source,
                    llm.temperature,
                    Duration::from_secs(llm.timeout_secs),
                ));
                Some((rewriter, Pacer::from_millis("rewriter", llm.pacing_ms)))
            }
            None => None,
        };

        Ok(Self::new(
            registry,
            Pacer::from_millis("registry", mb.pacing_ms),
            summaries,
            Pacer::from_millis("summaries", wiki.pacing_ms),
            rewriter,
            releases,
            Pacer::from_millis("releases", mb.releases_pacing_ms),
        ))
    }

    pub fn registry_name(&self) -> &str {
        self.registry.name()
    }

    pub fn summaries_name(&self) -> &str {
        self.summaries.name()
    }

    pub fn rewriter_name(&self) -> Option<&str> {
        self.rewriter.as_ref().map(|(r, _)| r.name())
    }

    pub fn releases_name(&self) -> &str {
        self.releases.name()
    }

    pub async fn search_artists(&self, name: &str) -> ProviderResponse<Vec<ArtistCandidate>> {
        let response = self
            .registry_pacer
            .run(|| self.registry.search_artists(name))
            .await;
        record(self.registry.name(), &response);
        response
    }

    pub async fn artist_relations(
        &self,
        external_id: &str,
    ) -> ProviderResponse<Vec<ArtistRelation>> {
        let response = self
            .registry_pacer
            .run(|| self.registry.artist_relations(external_id))
            .await;
        record(self.registry.name(), &response);
        response
    }

    pub async fn summary(&self, title: &str) -> ProviderResponse<String> {
        let response = self
            .summaries_pacer
            .run(|| self.summaries.summary(title))
            .await;
        record(self.summaries.name(), &response);
        response
    }

    /// `None` when no rewriter is configured.
    pub async fn rewrite_biography(
        &self,
        artist_name: &str,
        source: &str,
    ) -> Option<ProviderResponse<String>> {
        let (rewriter, pacer) = self.rewriter.as_ref()?;
        let response = pacer
            .run(|| rewriter.rewrite_biography(artist_name, source))
            .await;
        record(rewriter.name(), &response);
        Some(response)
    }

    pub async fn releases(&self, external_id: &str) -> ProviderResponse<Vec<NewRelease>> {
        let response = self
            .releases_pacer
            .run(|| self.releases.releases(external_id))
            .await;
        record(self.releases.name(), &response);
        response
    }
}
