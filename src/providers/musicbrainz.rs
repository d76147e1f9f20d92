//! MusicBrainz API client: artist search, URL relations and release listings.
//!
//! MusicBrainz answers 503 when a client exceeds its rate limit, so 503 is
//! treated as throttling alongside 429. Pacing itself happens in `ProviderSet`.

use super::http::decode_json;
use super::{ArtistCandidate, ArtistRegistry, ArtistRelation, ProviderResponse, ReleaseRegistry};
use crate::catalog_store::{NewRelease, NewTrack};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const THROTTLE_STATUSES: &[StatusCode] = &[StatusCode::SERVICE_UNAVAILABLE];
const SEARCH_LIMIT: usize = 10;

pub struct MusicBrainzClient {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ArtistSearchResponse {
    #[serde(default)]
    artists: Vec<MbArtist>,
}

#[derive(Deserialize)]
struct MbArtist {
    id: String,
    name: String,
    #[serde(default)]
    score: Option<u32>,
    #[serde(default)]
    aliases: Vec<MbAlias>,
}

#[derive(Deserialize)]
struct MbAlias {
    name: String,
}

#[derive(Deserialize)]
struct ArtistLookupResponse {
    #[serde(default)]
    relations: Vec<MbRelation>,
}

#[derive(Deserialize)]
struct MbRelation {
    #[serde(rename = "type")]
    relation_type: Option<String>,
    url: Option<MbUrl>,
}

#[derive(Deserialize)]
struct MbUrl {
    resource: Option<String>,
}

#[derive(Deserialize)]
struct ReleaseBrowseResponse {
    #[serde(default)]
    releases: Vec<MbRelease>,
}

#[derive(Deserialize)]
struct MbRelease {
    id: String,
    title: String,
    date: Option<String>,
    #[serde(default)]
    media: Vec<MbMedium>,
}

#[derive(Deserialize)]
struct MbMedium {
    #[serde(default)]
    tracks: Vec<MbTrack>,
}

#[derive(Deserialize)]
struct MbTrack {
    title: String,
    position: Option<u32>,
    length: Option<u64>,
}

impl MusicBrainzClient {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn browse_releases(
        &self,
        external_id: &str,
        limit: usize,
    ) -> ProviderResponse<Vec<NewRelease>> {
        let url = format!(
            "{}/release?artist={}&inc=recordings&fmt=json&limit={}",
            self.base_url,
            urlencoding::encode(external_id),
            limit
        );
        debug!("MusicBrainz release browse for {}", external_id);

        let response: ProviderResponse<ReleaseBrowseResponse> =
            decode_json(self.client.get(&url).send().await, THROTTLE_STATUSES).await;

        match response.map(|body| convert_releases(body.releases)) {
            ProviderResponse::Found(releases) if releases.is_empty() => ProviderResponse::NotFound,
            other => other,
        }
    }
}

fn convert_releases(releases: Vec<MbRelease>) -> Vec<NewRelease> {
    releases
        .into_iter()
        .map(|release| {
            let tracks = release
                .media
                .into_iter()
                .flat_map(|m| m.tracks)
                .enumerate()
                .map(|(index, track)| NewTrack {
                    title: track.title,
                    position: track.position.unwrap_or(index as u32 + 1),
                    duration_ms: track.length,
                })
                .collect();
            NewRelease {
                external_id: release.id,
                title: release.title,
                release_date: release.date.filter(|d| !d.is_empty()),
                tracks,
            }
        })
        .collect()
}

#[async_trait]
impl ArtistRegistry for MusicBrainzClient {
    fn name(&self) -> &str {
        "MusicBrainz"
    }

    async fn search_artists(&self, name: &str) -> ProviderResponse<Vec<ArtistCandidate>> {
        let query = format!("artist:\"{}\"", name.replace('"', ""));
        let url = format!(
            "{}/artist?query={}&fmt=json&limit={}",
            self.base_url,
            urlencoding::encode(&query),
            SEARCH_LIMIT
        );
        debug!("MusicBrainz artist search for {:?}", name);

        let response: ProviderResponse<ArtistSearchResponse> =
            decode_json(self.client.get(&url).send().await, THROTTLE_STATUSES).await;

        match response {
            ProviderResponse::Found(body) if body.artists.is_empty() => ProviderResponse::NotFound,
            other => other.map(|body| {
                body.artists
                    .into_iter()
                    .map(|a| ArtistCandidate {
                        id: a.id,
                        name: a.name,
                        score: a.score.unwrap_or(0),
                        aliases: a.aliases.into_iter().map(|alias| alias.name).collect(),
                    })
                    .collect()
            }),
        }
    }

    async fn artist_relations(&self, external_id: &str) -> ProviderResponse<Vec<ArtistRelation>> {
        let url = format!(
            "{}/artist/{}?inc=url-rels&fmt=json",
            self.base_url,
            urlencoding::encode(external_id)
        );

        let response: ProviderResponse<ArtistLookupResponse> =
            decode_json(self.client.get(&url).send().await, THROTTLE_STATUSES).await;

        response.map(|body| {
            body.relations
                .into_iter()
                .filter_map(|rel| {
                    let relation_type = rel.relation_type?;
                    let url = rel.url?.resource?;
                    Some(ArtistRelation { relation_type, url })
                })
                .collect()
        })
    }
}

/// Release listings served by the same MusicBrainz client.
pub struct MusicBrainzReleases {
    client: Arc<MusicBrainzClient>,
    limit: usize,
}

impl MusicBrainzReleases {
    pub fn new(client: Arc<MusicBrainzClient>, limit: usize) -> Self {
        Self { client, limit }
    }
}

#[async_trait]
impl ReleaseRegistry for MusicBrainzReleases {
    fn name(&self) -> &str {
        "MusicBrainz"
    }

    async fn releases(&self, external_id: &str) -> ProviderResponse<Vec<NewRelease>> {
        self.client.browse_releases(external_id, self.limit).await
    }
}
