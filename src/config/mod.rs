mod file_config;

pub use file_config::{
    EnrichmentConfig, FileConfig, LlmConfig, MusicBrainzConfig, WikipediaConfig,
};

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,

    pub enrichment: EnrichmentSettings,
    pub musicbrainz: MusicBrainzSettings,
    pub wikipedia: WikipediaSettings,
    /// None disables biography rewriting.
    pub llm: Option<LlmSettings>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentSettings {
    /// Biographies at least this many characters long are left alone.
    pub biography_min_length: usize,
    pub default_batch_size: usize,
    pub max_batch_size: usize,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            biography_min_length: 2000,
            default_batch_size: 10,
            max_batch_size: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MusicBrainzSettings {
    pub base_url: String,
    pub user_agent: String,
    pub pacing_ms: u64,
    pub releases_pacing_ms: u64,
    pub releases_limit: usize,
    pub timeout_secs: u64,
}

impl Default for MusicBrainzSettings {
    fn default() -> Self {
        Self {
            base_url: "https://musicbrainz.org/ws/2".to_string(),
            user_agent: format!("artist-enrichment-server/{}", env!("CARGO_PKG_VERSION")),
            pacing_ms: 1100,
            releases_pacing_ms: 1100,
            releases_limit: 25,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WikipediaSettings {
    pub base_url: String,
    pub pacing_ms: u64,
    pub timeout_secs: u64,
}

impl Default for WikipediaSettings {
    fn default() -> Self {
        Self {
            base_url: "https://en.wikipedia.org/api/rest_v1".to_string(),
            pacing_ms: 1000,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub api_key_command: Option<String>,
    pub pacing_ms: u64,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let enrichment_file = file.enrichment.unwrap_or_default();
        let enrichment_defaults = EnrichmentSettings::default();
        let enrichment = EnrichmentSettings {
            biography_min_length: enrichment_file
                .biography_min_length
                .unwrap_or(enrichment_defaults.biography_min_length),
            default_batch_size: enrichment_file
                .default_batch_size
                .unwrap_or(enrichment_defaults.default_batch_size),
            max_batch_size: enrichment_file
                .max_batch_size
                .unwrap_or(enrichment_defaults.max_batch_size),
        };
        if enrichment.max_batch_size == 0 {
            bail!("enrichment.max_batch_size must be positive");
        }
        if enrichment.default_batch_size == 0
            || enrichment.default_batch_size > enrichment.max_batch_size
        {
            bail!(
                "enrichment.default_batch_size must be between 1 and max_batch_size ({})",
                enrichment.max_batch_size
            );
        }

        let mb_file = file.musicbrainz.unwrap_or_default();
        let mb_defaults = MusicBrainzSettings::default();
        let musicbrainz = MusicBrainzSettings {
            base_url: trim_base_url(mb_file.base_url.unwrap_or(mb_defaults.base_url)),
            user_agent: mb_file.user_agent.unwrap_or(mb_defaults.user_agent),
            pacing_ms: mb_file.pacing_ms.unwrap_or(mb_defaults.pacing_ms),
            releases_pacing_ms: mb_file
                .releases_pacing_ms
                .unwrap_or(mb_defaults.releases_pacing_ms),
            releases_limit: mb_file.releases_limit.unwrap_or(mb_defaults.releases_limit),
            timeout_secs: mb_file.timeout_secs.unwrap_or(mb_defaults.timeout_secs),
        };

        let wiki_file = file.wikipedia.unwrap_or_default();
        let wiki_defaults = WikipediaSettings::default();
        let wikipedia = WikipediaSettings {
            base_url: trim_base_url(wiki_file.base_url.unwrap_or(wiki_defaults.base_url)),
            pacing_ms: wiki_file.pacing_ms.unwrap_or(wiki_defaults.pacing_ms),
            timeout_secs: wiki_file.timeout_secs.unwrap_or(wiki_defaults.timeout_secs),
        };

        let llm = match file.llm {
            Some(llm_file) => {
                if llm_file.api_key.is_some() && llm_file.api_key_command.is_some() {
                    bail!("Only one of llm.api_key and llm.api_key_command may be set");
                }
                let Some(model) = llm_file.model else {
                    bail!("llm.model must be set when the [llm] section is present");
                };
                Some(LlmSettings {
                    base_url: trim_base_url(
                        llm_file
                            .base_url
                            .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
                    ),
                    model,
                    api_key: llm_file.api_key,
                    api_key_command: llm_file.api_key_command,
                    pacing_ms: llm_file.pacing_ms.unwrap_or(1000),
                    temperature: llm_file.temperature.unwrap_or(0.3),
                    timeout_secs: llm_file.timeout_secs.unwrap_or(60),
                })
            }
            None => None,
        };

        Ok(Self {
            db_dir,
            port,
            metrics_port,
            logging_level,
            enrichment,
            musicbrainz,
            wikipedia,
            llm,
        })
    }

    pub fn catalog_db_path(&self) -> PathBuf {
        self.db_dir.join("catalog.db")
    }

    pub fn user_db_path(&self) -> PathBuf {
        self.db_dir.join("user.db")
    }

    pub fn server_db_path(&self) -> PathBuf {
        self.db_dir.join("server.db")
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
