//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per endpoint. When API routes or request
//! formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::Value;
use std::time::Duration;

/// HTTP test client carrying an optional bearer token
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    token: Option<String>,
}

impl TestClient {
    /// Creates a client that sends no credentials
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            token: None,
        }
    }

    /// Creates a client that authenticates with `token` on every request
    pub fn with_token(base_url: String, token: &str) -> Self {
        let mut client = Self::new(base_url);
        client.token = Some(token.to_string());
        client
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // ========================================================================
    // Enrichment Endpoints
    // ========================================================================

    /// POST /v1/admin/enrichment/{job} with a JSON body
    pub async fn run_batch(&self, job: &str, body: Value) -> Response {
        self.authorize(
            self.client
                .post(format!("{}/v1/admin/enrichment/{}", self.base_url, job))
                .json(&body),
        )
        .send()
        .await
        .expect("Run batch request failed")
    }

    /// POST /v1/admin/enrichment/{job} with a raw body
    pub async fn run_batch_raw(&self, job: &str, body: &str) -> Response {
        self.authorize(
            self.client
                .post(format!("{}/v1/admin/enrichment/{}", self.base_url, job))
                .header("Content-Type", "application/json")
                .body(body.to_string()),
        )
        .send()
        .await
        .expect("Run batch request failed")
    }

    /// GET /v1/admin/enrichment/{job}/status
    pub async fn job_status(&self, job: &str) -> Response {
        self.authorize(
            self.client
                .get(format!("{}/v1/admin/enrichment/{}/status", self.base_url, job)),
        )
        .send()
        .await
        .expect("Job status request failed")
    }

    /// GET /v1/admin/enrichment/audit
    pub async fn audit_log(&self, limit: usize, offset: usize) -> Response {
        self.authorize(self.client.get(format!(
            "{}/v1/admin/enrichment/audit?limit={}&offset={}",
            self.base_url, limit, offset
        )))
        .send()
        .await
        .expect("Audit log request failed")
    }

    /// GET /
    pub async fn home(&self) -> Response {
        self.authorize(self.client.get(format!("{}/", self.base_url)))
            .send()
            .await
            .expect("Home request failed")
    }
}
