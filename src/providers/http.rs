//! Translation of HTTP responses into `ProviderResponse`.

use super::ProviderResponse;
use reqwest::header::RETRY_AFTER;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Classifies a finished request and decodes its JSON body.
///
/// `throttle_statuses` lists extra statuses the provider uses to signal
/// throttling besides 429.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    result: reqwest::Result<Response>,
    throttle_statuses: &[StatusCode],
) -> ProviderResponse<T> {
    let response = match result {
        Ok(response) => response,
        Err(e) if e.is_timeout() => {
            return ProviderResponse::TransientError("request timed out".to_string())
        }
        Err(e) => return ProviderResponse::TransientError(e.to_string()),
    };

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return ProviderResponse::NotFound;
    }
    if status == StatusCode::TOO_MANY_REQUESTS || throttle_statuses.contains(&status) {
        return ProviderResponse::RateLimited(retry_after(&response));
    }
    if !status.is_success() {
        return ProviderResponse::TransientError(format!("HTTP {}", status.as_u16()));
    }

    match response.json::<T>().await {
        Ok(body) => ProviderResponse::Found(body),
        Err(e) => ProviderResponse::TransientError(format!("invalid response body: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn response(status: u16, headers: &[(&str, &str)], body: &str) -> reqwest::Result<Response> {
        let mut builder = axum::http::Response::builder().status(status);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        Ok(Response::from(builder.body(body.to_string()).unwrap()))
    }

    #[tokio::test]
    async fn classifies_statuses() {
        let found: ProviderResponse<Value> = decode_json(response(200, &[], r#"{"a":1}"#), &[]).await;
        assert_eq!(found, ProviderResponse::Found(serde_json::json!({"a": 1})));

        let missing: ProviderResponse<Value> = decode_json(response(404, &[], ""), &[]).await;
        assert_eq!(missing, ProviderResponse::NotFound);

        let failed: ProviderResponse<Value> = decode_json(response(500, &[], ""), &[]).await;
        assert_eq!(failed, ProviderResponse::TransientError("HTTP 500".to_string()));
    }

    #[tokio::test]
    async fn throttling_carries_retry_after() {
        let limited: ProviderResponse<Value> =
            decode_json(response(429, &[("Retry-After", "7")], ""), &[]).await;
        assert_eq!(limited, ProviderResponse::RateLimited(Some(Duration::from_secs(7))));

        let unavailable: ProviderResponse<Value> =
            decode_json(response(503, &[], ""), &[StatusCode::SERVICE_UNAVAILABLE]).await;
        assert_eq!(unavailable, ProviderResponse::RateLimited(None));

        let plain_503: ProviderResponse<Value> = decode_json(response(503, &[], ""), &[]).await;
        assert_eq!(plain_503, ProviderResponse::TransientError("HTTP 503".to_string()));
    }

    #[tokio::test]
    async fn undecodable_body_is_transient() {
        let garbled: ProviderResponse<Value> = decode_json(response(200, &[], "{oops"), &[]).await;
        assert!(matches!(garbled, ProviderResponse::TransientError(msg) if msg.starts_with("invalid response body")));
    }
}
