//! Wikipedia REST summary client.

use super::http::decode_json;
use super::{ProviderResponse, SummaryProvider};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub struct WikipediaClient {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct SummaryResponse {
    #[serde(rename = "type")]
    page_type: Option<String>,
    extract: Option<String>,
}

impl WikipediaClient {
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
}

#[async_trait]
impl SummaryProvider for WikipediaClient {
    fn name(&self) -> &str {
        "Wikipedia"
    }

    async fn summary(&self, title: &str) -> ProviderResponse<String> {
        let page = title.trim().replace(' ', "_");
        let url = format!(
            "{}/page/summary/{}",
            self.base_url,
            urlencoding::encode(&page)
        );
        debug!("Wikipedia summary for {:?}", page);

        let response: ProviderResponse<SummaryResponse> =
            decode_json(self.client.get(&url).send().await, &[]).await;

        match response {
            ProviderResponse::Found(body) => {
                // Disambiguation pages list candidates instead of describing one artist.
                if body.page_type.as_deref() == Some("disambiguation") {
                    return ProviderResponse::NotFound;
                }
                match body.extract.map(|e| e.trim().to_string()) {
                    Some(extract) if !extract.is_empty() => ProviderResponse::Found(extract),
                    _ => ProviderResponse::NotFound,
                }
            }
            other => other.map(|_| String::new()),
        }
    }
}
