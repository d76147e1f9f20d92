use super::models::{EnrichmentOutcome, JobKind};
use crate::catalog_store::{Artist, ArtistPredicate, CatalogStore};
use crate::providers::ProviderSet;
use async_trait::async_trait;
use std::sync::Arc;

/// Shared resources handed to every job invocation.
#[derive(Clone)]
pub struct JobContext {
    pub catalog: Arc<dyn CatalogStore>,
    pub providers: Arc<ProviderSet>,
}

/// One kind of enrichment, plugged into the generic batch runner.
///
/// A job only describes which artists it wants, when an artist already has
/// enough data, and how to fetch and merge new data for a single artist.
/// Skipping, error capture, counting and completion live in the runner.
#[async_trait]
pub trait EnrichmentJob: Send + Sync {
    fn kind(&self) -> JobKind;

    /// Selection predicate. `force_refresh` drops the field clause but keeps
    /// any prerequisite the job needs.
    fn predicate(&self, force_refresh: bool) -> ArtistPredicate;

    /// True when the artist needs no work unless a refresh is forced.
    fn is_sufficient(&self, artist: &Artist) -> bool;

    /// Whether the job looks the artist up by its external id.
    fn requires_external_id(&self) -> bool {
        true
    }

    /// Fetches and writes data for one artist. Errors are turned into
    /// `Failed` outcomes by the caller.
    async fn enrich(&self, artist: &Artist, ctx: &JobContext) -> anyhow::Result<EnrichmentOutcome>;
}
