//! Fakes shared by the enrichment unit tests.

use super::job::JobContext;
use crate::catalog_store::{
    Artist, ArtistPredicate, CatalogStore, NewRelease, Release, SocialLinks, SqliteCatalogStore,
};
use crate::providers::{
    ArtistCandidate, ArtistRegistry, ArtistRelation, Pacer, ProviderResponse, ProviderSet,
    ReleaseRegistry, SummaryProvider, TextRewriter,
};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Canned provider answers keyed by request argument. Anything not listed is
/// `NotFound`.
#[derive(Default)]
pub struct FakeBackend {
    pub search: HashMap<String, ProviderResponse<Vec<ArtistCandidate>>>,
    pub relations: HashMap<String, ProviderResponse<Vec<ArtistRelation>>>,
    pub summaries: HashMap<String, ProviderResponse<String>>,
    pub rewrite: Option<ProviderResponse<String>>,
    pub releases: HashMap<String, ProviderResponse<Vec<NewRelease>>>,
    /// Search for this name panics instead of answering.
    pub panic_on_search: Option<String>,
    calls: AtomicUsize,
    summary_titles: std::sync::Mutex<Vec<String>>,
}

fn canned<T: Clone>(map: &HashMap<String, ProviderResponse<T>>, key: &str) -> ProviderResponse<T> {
    map.get(key).cloned().unwrap_or(ProviderResponse::NotFound)
}

impl FakeBackend {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn summary_titles(&self) -> Vec<String> {
        self.summary_titles.lock().unwrap().clone()
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Wraps the backend in a provider set with no pacing delay.
    pub fn into_providers(self) -> (Arc<FakeBackend>, Arc<ProviderSet>) {
        let has_rewriter = self.rewrite.is_some();
        let backend = Arc::new(self);
        let rewriter = if has_rewriter {
            let dyn_rewriter: Arc<dyn TextRewriter> = backend.clone();
            Some((dyn_rewriter, Pacer::from_millis("rewriter", 0)))
        } else {
            None
        };
        let providers = ProviderSet::new(
            backend.clone(),
            Pacer::from_millis("registry", 0),
            backend.clone(),
            Pacer::from_millis("summaries", 0),
            rewriter,
            backend.clone(),
            Pacer::from_millis("releases", 0),
        );
        (backend, Arc::new(providers))
    }
}

#[async_trait]
impl ArtistRegistry for FakeBackend {
    fn name(&self) -> &str {
        "Registry"
    }

    async fn search_artists(&self, name: &str) -> ProviderResponse<Vec<ArtistCandidate>> {
        self.hit();
        if self.panic_on_search.as_deref() == Some(name) {
            panic!("search exploded for {}", name);
        }
        canned(&self.search, name)
    }

    async fn artist_relations(&self, external_id: &str) -> ProviderResponse<Vec<ArtistRelation>> {
        self.hit();
        canned(&self.relations, external_id)
    }
}

#[async_trait]
impl SummaryProvider for FakeBackend {
    fn name(&self) -> &str {
        "Summaries"
    }

    async fn summary(&self, title: &str) -> ProviderResponse<String> {
        self.hit();
        self.summary_titles.lock().unwrap().push(title.to_string());
        canned(&self.summaries, title)
    }
}

#[async_trait]
impl TextRewriter for FakeBackend {
    fn name(&self) -> &str {
        "Rewriter"
    }

    async fn rewrite_biography(&self, _artist_name: &str, _source: &str) -> ProviderResponse<String> {
        self.hit();
        self.rewrite.clone().unwrap_or(ProviderResponse::NotFound)
    }
}

#[async_trait]
impl ReleaseRegistry for FakeBackend {
    fn name(&self) -> &str {
        "Releases"
    }

    async fn releases(&self, external_id: &str) -> ProviderResponse<Vec<NewRelease>> {
        self.hit();
        canned(&self.releases, external_id)
    }
}

pub fn candidate(id: &str, name: &str, score: u32) -> ArtistCandidate {
    ArtistCandidate {
        id: id.to_string(),
        name: name.to_string(),
        score,
        aliases: vec![],
    }
}

pub fn relation(relation_type: &str, url: &str) -> ArtistRelation {
    ArtistRelation {
        relation_type: relation_type.to_string(),
        url: url.to_string(),
    }
}

pub fn artist_with_id(id: &str, name: &str, external_id: &str) -> Artist {
    let mut artist = Artist::new(id, name);
    artist.external_id = Some(external_id.to_string());
    artist
}

pub fn temp_catalog(artists: &[Artist]) -> (TempDir, Arc<SqliteCatalogStore>) {
    let dir = TempDir::new().unwrap();
    let store = SqliteCatalogStore::new(dir.path().join("catalog.db")).unwrap();
    for artist in artists {
        store.insert_artist(artist).unwrap();
    }
    (dir, Arc::new(store))
}

pub fn context(catalog: Arc<dyn CatalogStore>, providers: Arc<ProviderSet>) -> JobContext {
    JobContext {
        catalog,
        providers,
    }
}

/// Hands out a fixed list of artists whatever the predicate, and refuses writes.
/// With `broken` set, every call fails.
pub struct FixedCatalog {
    pub artists: Vec<Artist>,
    pub broken: bool,
}

impl FixedCatalog {
    fn check(&self) -> Result<()> {
        if self.broken {
            bail!("database is locked");
        }
        Ok(())
    }
}

impl CatalogStore for FixedCatalog {
    fn select_artists(
        &self,
        _predicate: &ArtistPredicate,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Artist>> {
        self.check()?;
        Ok(self.artists.iter().skip(offset).take(limit).cloned().collect())
    }

    fn count_artists(&self, _predicate: &ArtistPredicate) -> Result<usize> {
        self.check()?;
        Ok(self.artists.len())
    }

    fn count_artists_among(&self, _predicate: &ArtistPredicate, ids: &[String]) -> Result<usize> {
        self.check()?;
        Ok(self.artists.iter().filter(|a| ids.contains(&a.id)).count())
    }

    fn get_artist(&self, id: &str) -> Result<Option<Artist>> {
        self.check()?;
        Ok(self.artists.iter().find(|a| a.id == id).cloned())
    }

    fn insert_artist(&self, _artist: &Artist) -> Result<()> {
        bail!("read-only catalog")
    }

    fn set_external_id(&self, _artist_id: &str, _external_id: &str) -> Result<bool> {
        bail!("read-only catalog")
    }

    fn set_biography(&self, _artist_id: &str, _biography: &str, _source: &str) -> Result<()> {
        bail!("read-only catalog")
    }

    fn fill_social_links(&self, _artist_id: &str, _links: &SocialLinks) -> Result<usize> {
        bail!("read-only catalog")
    }

    fn replace_releases(&self, _artist_id: &str, _releases: &[NewRelease]) -> Result<()> {
        bail!("read-only catalog")
    }

    fn get_releases(&self, _artist_id: &str) -> Result<Vec<Release>> {
        Ok(vec![])
    }
}
