use axum::extract::FromRef;

use crate::enrichment::EnrichmentService;
use crate::user::UserStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedUserStore = Arc<dyn UserStore>;
pub type GuardedEnrichmentService = Arc<EnrichmentService>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub user_store: GuardedUserStore,
    pub enrichment: GuardedEnrichmentService,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedUserStore {
    fn from_ref(input: &ServerState) -> Self {
        input.user_store.clone()
    }
}

impl FromRef<ServerState> for GuardedEnrichmentService {
    fn from_ref(input: &ServerState) -> Self {
        input.enrichment.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
