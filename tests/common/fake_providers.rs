//! In-process stand-ins for the registry and encyclopedia APIs
//!
//! Serves the subset of the MusicBrainz and Wikipedia REST shapes the
//! providers read, with data from `constants`.

use super::constants::*;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Default)]
pub struct FakeProviderState {
    /// Every request received, across all endpoints.
    pub hits: AtomicUsize,
    /// When set the registry answers 503, its throttling signal.
    pub throttled: AtomicBool,
}

/// A running fake provider server.
pub struct FakeProviders {
    /// e.g. "http://127.0.0.1:12345"
    pub base_url: String,
    pub state: Arc<FakeProviderState>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl FakeProviders {
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeProviderState::default());
        let app = Router::new()
            .route("/ws/2/artist", get(search_artists))
            .route("/ws/2/artist/{id}", get(artist_lookup))
            .route("/ws/2/release", get(browse_releases))
            .route("/wiki/page/summary/{title}", get(page_summary))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake provider port");
        let port = listener.local_addr().expect("No local address").port();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fake provider server failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn musicbrainz_url(&self) -> String {
        format!("{}/ws/2", self.base_url)
    }

    pub fn wikipedia_url(&self) -> String {
        format!("{}/wiki", self.base_url)
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn set_throttled(&self, throttled: bool) {
        self.state.throttled.store(throttled, Ordering::SeqCst);
    }
}

impl Drop for FakeProviders {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn registry_gate(state: &FakeProviderState) -> Option<Response> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if state.throttled.load(Ordering::SeqCst) {
        return Some(StatusCode::SERVICE_UNAVAILABLE.into_response());
    }
    None
}

/// GET /ws/2/artist?query=artist:"<name>"
async fn search_artists(
    State(state): State<Arc<FakeProviderState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Some(response) = registry_gate(&state) {
        return response;
    }
    let query = params.get("query").cloned().unwrap_or_default();
    let name = query
        .trim_start_matches("artist:")
        .trim_matches('"')
        .to_string();

    let artists = if name == ARTIST_A_NAME {
        json!([
            { "id": "zzz-000", "name": "Artist A Tribute", "score": 100 },
            { "id": ARTIST_A_MBID, "name": ARTIST_A_NAME, "score": 95,
              "aliases": [{ "name": "A" }] },
        ])
    } else if name == ARTIST_D_NAME {
        json!([{ "id": ARTIST_D_MBID, "name": ARTIST_D_NAME, "score": 100 }])
    } else {
        json!([])
    };
    Json(json!({ "artists": artists })).into_response()
}

/// GET /ws/2/artist/{id}?inc=url-rels
async fn artist_lookup(
    State(state): State<Arc<FakeProviderState>>,
    Path(id): Path<String>,
) -> Response {
    if let Some(response) = registry_gate(&state) {
        return response;
    }
    let relations = match id.as_str() {
        ARTIST_A_MBID => json!([
            { "type": "wikipedia",
              "url": { "resource": format!("https://en.wikipedia.org/wiki/{}", ARTIST_A_WIKI_TITLE) } },
            { "type": "social network",
              "url": { "resource": format!("https://www.instagram.com/{}/", ARTIST_A_INSTAGRAM) } },
            { "type": "social network",
              "url": { "resource": format!("https://twitter.com/{}", ARTIST_A_TWITTER) } },
            { "type": "official homepage",
              "url": { "resource": ARTIST_A_HOMEPAGE } },
        ]),
        ARTIST_B_MBID | ARTIST_C_MBID => json!([]),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    Json(json!({ "id": id, "relations": relations })).into_response()
}

/// GET /ws/2/release?artist=<id>&inc=recordings
async fn browse_releases(
    State(state): State<Arc<FakeProviderState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Some(response) = registry_gate(&state) {
        return response;
    }
    let releases = match params.get("artist").map(String::as_str) {
        Some(ARTIST_A_MBID) => json!([{
            "id": "rel-1",
            "title": ARTIST_A_RELEASE_TITLE,
            "date": "2001-04-02",
            "media": [{
                "tracks": [
                    { "title": "Dawn", "position": 1, "length": 201000 },
                    { "title": "Dusk", "position": 2, "length": null },
                ]
            }]
        }]),
        _ => json!([]),
    };
    Json(json!({ "releases": releases })).into_response()
}

/// GET /wiki/page/summary/{title}
async fn page_summary(
    State(state): State<Arc<FakeProviderState>>,
    Path(title): Path<String>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if title == ARTIST_A_WIKI_TITLE {
        Json(json!({ "type": "standard", "title": title, "extract": ARTIST_A_SUMMARY }))
            .into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}
