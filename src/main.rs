use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use artist_enrichment_server::catalog_store::SqliteCatalogStore;
use artist_enrichment_server::config::{AppConfig, CliConfig, FileConfig};
use artist_enrichment_server::enrichment::{EnrichmentService, JobContext};
use artist_enrichment_server::providers::ProviderSet;
use artist_enrichment_server::server::{self, run_server, RequestsLoggingLevel, ServerConfig};
use artist_enrichment_server::server_store::SqliteServerStore;
use artist_enrichment_server::user::SqliteUserStore;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding catalog.db, user.db and server.db.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Optional TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Could not initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let cli_config = CliConfig {
        db_dir: cli_args.db_dir,
        port: cli_args.port,
        metrics_port: cli_args.metrics_port,
        logging_level: cli_args.logging_level,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Initializing metrics...");
    server::metrics::init_metrics();

    info!(
        "Opening SQLite catalog database at {:?}...",
        config.catalog_db_path()
    );
    let catalog_store = Arc::new(SqliteCatalogStore::new(config.catalog_db_path())?);

    let user_store = Arc::new(SqliteUserStore::new(config.user_db_path())?);
    let server_store = Arc::new(SqliteServerStore::new(config.server_db_path())?);

    let providers = ProviderSet::from_config(&config)?;
    match providers.rewriter_name() {
        Some(name) => info!("Biography rewriting through {}", name),
        None => info!("No [llm] section, biographies are stored as fetched"),
    }

    let enrichment = Arc::new(EnrichmentService::new(
        JobContext {
            catalog: catalog_store,
            providers: Arc::new(providers),
        },
        server_store,
        config.enrichment.clone(),
    ));

    info!("Ready to serve at port {}!", config.port);
    info!("Metrics available at port {}!", config.metrics_port);
    run_server(
        user_store,
        enrichment,
        ServerConfig {
            requests_logging_level: config.logging_level,
            port: config.port,
            metrics_port: config.metrics_port,
        },
    )
    .await
}
