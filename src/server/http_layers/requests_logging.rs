//! Request logging middleware

use super::super::state::ServerState;
use crate::server::metrics::{record_error, record_http_request};
use axum::extract::{MatchedPath, State};
use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::{error, info};

#[derive(PartialEq, PartialOrd, Clone, Debug, Default, clap::ValueEnum)]
pub enum RequestsLoggingLevel {
    None,
    #[default]
    Path,
    Headers,
    Body,
}

impl std::fmt::Display for RequestsLoggingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

const MAX_LOGGABLE_BODY_LENGTH: usize = 1024;

/// Headers carrying API tokens are never written to the log.
fn is_redacted(name: &header::HeaderName) -> bool {
    *name == header::AUTHORIZATION || *name == header::COOKIE
}

fn log_headers(label: &str, headers: &HeaderMap) {
    info!("  {} Headers:", label);
    for (name, value) in headers.iter() {
        if is_redacted(name) {
            info!("    {:?}: <redacted>", name);
        } else {
            info!("    {:?}: {:?}", name, value);
        }
    }
}

fn content_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse::<usize>()
        .ok()
}

/// Logs a small body and hands back an equivalent one. Bodies of unknown or
/// large size are passed through untouched.
async fn log_body(label: &str, headers: &HeaderMap, body: Body) -> Result<Body, ()> {
    let size = match content_length(headers) {
        Some(size) => size,
        None => {
            info!("  {} Body: unknown length", label);
            return Ok(body);
        }
    };
    if size >= MAX_LOGGABLE_BODY_LENGTH {
        info!("  {} Body: too big to log ({} bytes)", label, size);
        return Ok(body);
    }

    let bytes: Bytes = axum::body::to_bytes(body, size).await.map_err(|err| {
        error!("Failed to read {} body: {:?}", label, err);
    })?;
    info!("  {} Body:\n{}", label, String::from_utf8_lossy(&bytes));
    Ok(Body::from(bytes))
}

pub async fn log_requests(
    State(state): State<ServerState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let level = state.config.requests_logging_level.clone();
    let start = Instant::now();

    let method = request.method().to_string();
    // Route templates keep the metric label set bounded.
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    if level > RequestsLoggingLevel::None {
        info!(">>> {} {}", method, request.uri());
    }
    if level >= RequestsLoggingLevel::Headers {
        log_headers("Req", request.headers());
    }

    let request = if level >= RequestsLoggingLevel::Body {
        let (parts, body) = request.into_parts();
        match log_body("Req", &parts.headers, body).await {
            Ok(body) => Request::from_parts(parts, body),
            Err(()) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    } else {
        request
    };

    let response = next.run(request).await;

    if level >= RequestsLoggingLevel::Headers {
        log_headers("Resp", response.headers());
    }

    let response = if level >= RequestsLoggingLevel::Body {
        let (parts, body) = response.into_parts();
        match log_body("Resp", &parts.headers, body).await {
            Ok(body) => Response::from_parts(parts, body),
            Err(()) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    } else {
        response
    };

    let status = response.status().as_u16();
    let duration = start.elapsed();

    if level > RequestsLoggingLevel::None {
        info!("<<< {} {} {} ({}ms)", status, method, path, duration.as_millis());
    }

    record_http_request(&method, &path, status, duration);
    if status >= 500 {
        record_error("server_error", &path);
    }

    response
}
