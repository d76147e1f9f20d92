use anyhow::{Context, Result};
use std::time::{Duration, Instant};

use tracing::{error, info};

use axum::{extract::State, middleware, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use super::enrichment_routes::enrichment_routes;
use super::metrics::metrics_handler;
use super::{log_requests, state::*, ServerConfig};
use crate::enrichment::EnrichmentService;
use crate::server::session::Session;
use crate::user::UserStore;
use std::sync::Arc;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub session_token: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        session_token: session.map(|s| s.token),
    };
    Json(stats)
}

impl ServerState {
    fn new(
        config: ServerConfig,
        user_store: Arc<dyn UserStore>,
        enrichment: Arc<EnrichmentService>,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            user_store,
            enrichment,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    user_store: Arc<dyn UserStore>,
    enrichment: Arc<EnrichmentService>,
) -> Router {
    let state = ServerState::new(config, user_store, enrichment);

    let admin_routes: Router = Router::new()
        .nest("/enrichment", enrichment_routes())
        .with_state(state.clone());

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    home_router
        .nest("/v1/admin", admin_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(
    user_store: Arc<dyn UserStore>,
    enrichment: Arc<EnrichmentService>,
    config: ServerConfig,
) -> Result<()> {
    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.metrics_port))
        .await
        .with_context(|| format!("Could not bind metrics port {}", config.metrics_port))?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, make_metrics_app()).await {
            error!("Metrics server stopped: {}", e);
        }
    });

    let port = config.port;
    let app = make_app(config, user_store, enrichment);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Could not bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    Ok(axum::serve(listener, app).await?)
}
