use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_dir: Option<String>,
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,

    // Feature configs
    pub enrichment: Option<EnrichmentConfig>,
    pub musicbrainz: Option<MusicBrainzConfig>,
    pub wikipedia: Option<WikipediaConfig>,
    pub llm: Option<LlmConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub biography_min_length: Option<usize>,
    pub default_batch_size: Option<usize>,
    pub max_batch_size: Option<usize>,
}

/// Artist registry. Also used for release and track listings.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct MusicBrainzConfig {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub pacing_ms: Option<u64>,
    pub releases_pacing_ms: Option<u64>,
    pub releases_limit: Option<usize>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct WikipediaConfig {
    pub base_url: Option<String>,
    pub pacing_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
}

/// OpenAI-compatible rewriter. Biographies are stored unrewritten when absent.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    /// Shell command printing the API key, run before each request.
    pub api_key_command: Option<String>,
    pub pacing_ms: Option<u64>,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
