//! OpenAI-compatible biography rewriter.
//!
//! Works with OpenAI, OpenRouter, vLLM and any other service implementing the
//! chat completions API.

use super::http::decode_json;
use super::{ProviderResponse, TextRewriter};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Timeout for api_key_command execution.
const API_KEY_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

const SYSTEM_PROMPT: &str = "You write concise, neutral, third-person biographies of music \
artists for a music catalog. Use only facts present in the source text. Do not add opinions, \
marketing language, headings or lists. Answer with the biography text only.";

#[derive(Debug, Error)]
pub enum ApiKeyError {
    #[error("Failed to execute api_key_command: {0}")]
    Execution(String),
    #[error("api_key_command timed out")]
    Timeout,
    #[error("api_key_command failed: {0}")]
    Failed(String),
}

/// Source of API key for authentication.
#[derive(Debug, Clone)]
pub enum ApiKeySource {
    /// No authentication.
    None,
    /// Static API key.
    Static(String),
    /// Shell command that outputs the API key (for rotating tokens).
    Command(String),
}

impl ApiKeySource {
    /// Get the current API key, executing the command if necessary.
    async fn get_key(&self) -> Result<Option<String>, ApiKeyError> {
        match self {
            ApiKeySource::None => Ok(None),
            ApiKeySource::Static(key) => Ok(Some(key.clone())),
            ApiKeySource::Command(cmd) => {
                debug!(command = %cmd, "Fetching API key via command");

                let output = match tokio::time::timeout(
                    API_KEY_COMMAND_TIMEOUT,
                    Command::new("sh").arg("-c").arg(cmd).output(),
                )
                .await
                {
                    Ok(Ok(output)) => output,
                    Ok(Err(e)) => {
                        warn!(command = %cmd, error = %e, "api_key_command failed to execute");
                        return Err(ApiKeyError::Execution(e.to_string()));
                    }
                    Err(_) => {
                        warn!(command = %cmd, "api_key_command timed out");
                        return Err(ApiKeyError::Timeout);
                    }
                };

                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    return Err(ApiKeyError::Failed(format!(
                        "status {}: {}",
                        output.status, stderr
                    )));
                }

                let key = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if key.is_empty() {
                    return Err(ApiKeyError::Failed("empty key".to_string()));
                }
                Ok(Some(key))
            }
        }
    }
}

pub struct OpenAiRewriter {
    client: Client,
    base_url: String,
    model: String,
    api_key_source: ApiKeySource,
    temperature: f32,
    timeout: Duration,
}

impl OpenAiRewriter {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key_source: ApiKeySource,
        temperature: f32,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key_source,
            temperature,
            timeout,
        }
    }

    fn build_request(&self, artist_name: &str, source: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!(
                        "Artist: {}\n\nSource text:\n{}\n\nWrite the biography.",
                        artist_name, source
                    ),
                },
            ],
            temperature: Some(self.temperature),
        }
    }
}

#[async_trait]
impl TextRewriter for OpenAiRewriter {
    fn name(&self) -> &str {
        "LLM"
    }

    async fn rewrite_biography(&self, artist_name: &str, source: &str) -> ProviderResponse<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = self.build_request(artist_name, source);

        let mut req_builder = self.client.post(&url).json(&request).timeout(self.timeout);
        match self.api_key_source.get_key().await {
            Ok(Some(api_key)) => {
                req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
            }
            Ok(None) => {}
            Err(e) => return ProviderResponse::TransientError(e.to_string()),
        }

        debug!(model = %self.model, artist = %artist_name, "Requesting biography rewrite");

        let response: ProviderResponse<ChatResponse> =
            decode_json(req_builder.send().await, &[]).await;

        match response {
            ProviderResponse::Found(body) => {
                let text = body
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .map(|c| c.trim().to_string())
                    .unwrap_or_default();
                if text.is_empty() {
                    ProviderResponse::TransientError("empty completion".to_string())
                } else {
                    ProviderResponse::Found(text)
                }
            }
            // A 404 from a completions endpoint means misconfiguration, not a missing entity.
            ProviderResponse::NotFound => {
                ProviderResponse::TransientError("completions endpoint not found".to_string())
            }
            other => other.map(|_| String::new()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_artist_and_source() {
        let rewriter = OpenAiRewriter::new(
            "http://localhost/v1/",
            "model-x",
            ApiKeySource::None,
            0.2,
            Duration::from_secs(5),
        );
        let request = rewriter.build_request("Artist B", "Some summary.");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "model-x");
        assert_eq!(json["messages"][0]["role"], "system");
        let user = json["messages"][1]["content"].as_str().unwrap();
        assert!(user.contains("Artist B"));
        assert!(user.contains("Some summary."));
        assert_eq!(rewriter.base_url, "http://localhost/v1");
    }

    #[tokio::test]
    async fn static_and_command_keys() {
        assert_eq!(
            ApiKeySource::Static("k".to_string()).get_key().await.unwrap(),
            Some("k".to_string())
        );
        assert_eq!(
            ApiKeySource::Command("echo from-cmd".to_string())
                .get_key()
                .await
                .unwrap(),
            Some("from-cmd".to_string())
        );
        assert!(ApiKeySource::Command("exit 3".to_string())
            .get_key()
            .await
            .is_err());
    }
}
