//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own databases and its own
//! fake provider server, wired through the regular TOML configuration path.

use super::constants::*;
use super::fake_providers::FakeProviders;
use super::fixtures::{create_test_catalog, create_test_users, TestTokens};
use artist_enrichment_server::catalog_store::SqliteCatalogStore;
use artist_enrichment_server::config::{AppConfig, CliConfig, FileConfig};
use artist_enrichment_server::enrichment::{EnrichmentService, JobContext};
use artist_enrichment_server::providers::ProviderSet;
use artist_enrichment_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use artist_enrichment_server::server_store::SqliteServerStore;
use artist_enrichment_server::user::SqliteUserStore;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with isolated databases
///
/// When dropped, the server shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Direct access to the catalog for assertions
    pub catalog: Arc<SqliteCatalogStore>,

    /// The fake registry and encyclopedia
    pub providers: FakeProviders,

    pub tokens: TestTokens,

    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

fn test_config(db_dir: &TempDir, providers: &FakeProviders) -> AppConfig {
    let toml = format!(
        r#"
        logging_level = "none"

        [enrichment]
        biography_min_length = 2000
        default_batch_size = 10
        max_batch_size = 50

        [musicbrainz]
        base_url = "{}"
        pacing_ms = 0
        releases_pacing_ms = 0
        timeout_secs = 5

        [wikipedia]
        base_url = "{}"
        pacing_ms = 0
        timeout_secs = 5
        "#,
        providers.musicbrainz_url(),
        providers.wikipedia_url(),
    );
    let file_config: FileConfig = toml::from_str(&toml).expect("Invalid test config");
    let cli = CliConfig {
        db_dir: Some(db_dir.path().to_path_buf()),
        ..Default::default()
    };
    AppConfig::resolve(&cli, Some(file_config)).expect("Failed to resolve test config")
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if fixtures can't be created or the server doesn't become ready.
    pub async fn spawn() -> Self {
        let providers = FakeProviders::spawn().await;

        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        create_test_catalog(temp_db_dir.path()).expect("Failed to create test catalog");
        let tokens = create_test_users(temp_db_dir.path()).expect("Failed to create test users");

        let config = test_config(&temp_db_dir, &providers);

        let catalog = Arc::new(
            SqliteCatalogStore::new(config.catalog_db_path()).expect("Failed to open catalog"),
        );
        let user_store =
            Arc::new(SqliteUserStore::new(config.user_db_path()).expect("Failed to open users"));
        let server_store = Arc::new(
            SqliteServerStore::new(config.server_db_path()).expect("Failed to open server store"),
        );
        let provider_set = ProviderSet::from_config(&config).expect("Failed to build providers");

        let enrichment = Arc::new(EnrichmentService::new(
            JobContext {
                catalog: catalog.clone(),
                providers: Arc::new(provider_set),
            },
            server_store,
            config.enrichment.clone(),
        ));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let server_config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port,
            metrics_port: 0,
        };
        let app = make_app(server_config, user_store, enrichment);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            catalog,
            providers,
            tokens,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };
        server.wait_for_ready().await;
        server
    }

    /// Polls the home endpoint until the server answers.
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
