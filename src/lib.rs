//! Artist Enrichment Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod catalog_store;
pub mod config;
pub mod enrichment;
pub mod providers;
pub mod server;
pub mod server_store;
pub mod sqlite_persistence;
pub mod user;

// Re-export commonly used types for convenience
pub use catalog_store::{CatalogStore, SqliteCatalogStore};
pub use enrichment::{EnrichmentService, JobContext};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use server_store::{ServerStore, SqliteServerStore};
pub use user::{SqliteUserStore, UserRole, UserStore};
