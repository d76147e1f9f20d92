use super::state::ServerState;
use crate::user::auth::AuthTokenValue;
use crate::user::{resolve_permissions, Permission};

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::json;
use tracing::debug;

#[derive(Debug)]
pub struct Session {
    pub user_id: usize,
    pub token: String,
    pub permissions: Vec<Permission>,
}

impl Session {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

pub const COOKIE_SESSION_TOKEN_KEY: &str = "session_token";
pub const HEADER_SESSION_TOKEN_KEY: &str = "Authorization";
const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug)]
pub enum SessionExtractionError {
    Unauthorized,
    InternalError,
}

impl IntoResponse for SessionExtractionError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            SessionExtractionError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            SessionExtractionError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };
        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

async fn extract_session_token_from_cookies(
    parts: &mut Parts,
    ctx: &ServerState,
) -> Option<String> {
    CookieJar::from_request_parts(parts, ctx)
        .await
        .ok()?
        .get(COOKIE_SESSION_TOKEN_KEY)
        .map(Cookie::value)
        .map(|s| s.to_string())
}

fn extract_session_token_from_headers(parts: &mut Parts) -> Option<String> {
    let value = parts.headers.get(HEADER_SESSION_TOKEN_KEY)?;
    let value = String::from_utf8_lossy(value.as_bytes());
    let token = value.strip_prefix(BEARER_PREFIX).unwrap_or(&value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

async fn extract_session_from_request_parts(
    parts: &mut Parts,
    ctx: &ServerState,
) -> Result<Option<Session>, SessionExtractionError> {
    let token = match extract_session_token_from_cookies(parts, ctx)
        .await
        .or_else(|| extract_session_token_from_headers(parts))
    {
        None => {
            debug!("No token in cookies nor headers.");
            return Ok(None);
        }
        Some(x) => x,
    };

    let auth_token_value = AuthTokenValue(token);
    let auth_token = match ctx.user_store.get_user_auth_token(&auth_token_value) {
        Ok(Some(token)) => {
            debug!("Found auth token for user_id={}", token.user_id);

            if let Err(e) = ctx
                .user_store
                .update_user_auth_token_last_used_timestamp(&auth_token_value)
            {
                debug!("Failed to update auth token last_used timestamp: {}", e);
            }

            token
        }
        Ok(None) => {
            debug!("Auth token not found in database");
            return Ok(None);
        }
        Err(e) => {
            debug!("Failed to get auth token from database: {}", e);
            return Err(SessionExtractionError::InternalError);
        }
    };

    let roles = ctx
        .user_store
        .get_user_roles(auth_token.user_id)
        .map_err(|e| {
            debug!(
                "Failed to resolve roles for user_id={}: {}",
                auth_token.user_id, e
            );
            SessionExtractionError::InternalError
        })?;

    Ok(Some(Session {
        user_id: auth_token.user_id,
        token: auth_token.value.0,
        permissions: resolve_permissions(&roles),
    }))
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_session_from_request_parts(parts, ctx)
            .await?
            .ok_or(SessionExtractionError::Unauthorized)
    }
}

impl OptionalFromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        extract_session_from_request_parts(parts, ctx).await
    }
}
