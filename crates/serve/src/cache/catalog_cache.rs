//! Catalog caching
//!
//! [`CatalogCache`] owns every time-bounded cache the API uses:
//!
//! - the search snapshot, rebuilt from [`PluginStore::get_search_index`]
//! - the category list used to validate category updates
//! - the `/tags` and `/categories` responses
//! - rendered `/plugins` pages for unfiltered listings
//!
//! Loads go through `try_get_with`, so concurrent misses on the same entry
//! wait for a single store call instead of each issuing their own.
//!
//! Entries derived from plugin records are keyed by a generation counter
//! that [`CatalogCache::invalidate_plugins`] bumps. A load that was already
//! running when an edit landed finishes under the old generation and is
//! never served again.

use moka::future::Cache;
use plugdir_core::config::CacheConfig;
use plugdir_core::search::{SearchPage, SearchSnapshot};
use plugdir_core::store::PluginStore;
use plugdir_core::types::{Category, Tag};
use plugdir_core::{PlugdirError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Key of a cached `/plugins` response
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseKey {
    /// Plugin generation the page was rendered from
    pub generation: u64,
    /// Raw query string
    pub query: String,
    /// Requested page
    pub page: usize,
}

impl ResponseKey {
    pub fn new<S: Into<String>>(generation: u64, query: S, page: usize) -> Self {
        Self {
            generation,
            query: query.into(),
            page,
        }
    }
}

/// Maximum number of cached `/plugins` responses
const RESPONSE_CAPACITY: u64 = 1_000;

/// Room for a late insert under a retired generation next to the live one
const GENERATION_CAPACITY: u64 = 4;

fn single_entry<V>(ttl_seconds: u64) -> Cache<(), V>
where
    V: Clone + Send + Sync + 'static,
{
    Cache::builder()
        .max_capacity(1)
        .time_to_live(Duration::from_secs(ttl_seconds))
        .build()
}

fn per_generation<V>(ttl_seconds: u64) -> Cache<u64, V>
where
    V: Clone + Send + Sync + 'static,
{
    Cache::builder()
        .max_capacity(GENERATION_CAPACITY)
        .time_to_live(Duration::from_secs(ttl_seconds))
        .build()
}

/// Recover an owned error from a shared loader failure
///
/// Callers that only observed a failure started by another request get a
/// storage error carrying the original message.
fn unshare(error: Arc<PlugdirError>) -> PlugdirError {
    Arc::try_unwrap(error).unwrap_or_else(|shared| PlugdirError::database(shared.to_string()))
}

/// Time-bounded caches over the plugin store
pub struct CatalogCache {
    generation: AtomicU64,
    snapshot: Cache<u64, Arc<SearchSnapshot>>,
    categories: Cache<(), Arc<Vec<Category>>>,
    category_list: Cache<(), Arc<Vec<Category>>>,
    tag_list: Cache<u64, Arc<Vec<Tag>>>,
    responses: Cache<ResponseKey, Arc<SearchPage>>,
    response_cache_max_page: usize,
}

impl CatalogCache {
    /// Creates caches with lifetimes taken from `config`
    ///
    /// # Examples
    ///
    /// ```
    /// use plugdir_core::config::CacheConfig;
    /// use plugdir_serve::cache::CatalogCache;
    ///
    /// let cache = CatalogCache::new(&CacheConfig::default());
    /// assert!(cache.is_cacheable("", 1));
    /// assert!(!cache.is_cacheable("tag:git", 1));
    /// ```
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            generation: AtomicU64::new(0),
            snapshot: per_generation(config.search_index_ttl_seconds),
            categories: single_entry(config.categories_ttl_seconds),
            category_list: single_entry(config.reference_ttl_seconds),
            tag_list: per_generation(config.reference_ttl_seconds),
            responses: Cache::builder()
                .max_capacity(RESPONSE_CAPACITY)
                .time_to_live(Duration::from_secs(config.response_ttl_seconds))
                .build(),
            response_cache_max_page: config.response_cache_max_page,
        }
    }

    /// Current plugin generation
    ///
    /// Read once per request and pass it to [`Self::snapshot_at`],
    /// [`Self::cached_page`] and [`Self::store_page`] so every entry the
    /// request touches belongs to the same generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Search snapshot for the current generation
    pub async fn snapshot(&self, store: &dyn PluginStore) -> Result<Arc<SearchSnapshot>> {
        self.snapshot_at(self.generation(), store).await
    }

    /// Search snapshot for `generation`, rebuilt from `store` once expired
    ///
    /// # Errors
    ///
    /// Returns the store's error when the rebuild fails; nothing is cached
    /// in that case
    pub async fn snapshot_at(
        &self,
        generation: u64,
        store: &dyn PluginStore,
    ) -> Result<Arc<SearchSnapshot>> {
        self.snapshot
            .try_get_with(generation, async {
                let plugins = store.get_search_index().await?;
                debug!(
                    "Rebuilt search snapshot with {} plugins (generation {})",
                    plugins.len(),
                    generation
                );
                Ok::<_, PlugdirError>(Arc::new(SearchSnapshot::new(plugins)))
            })
            .await
            .map_err(unshare)
    }

    /// Category list used to validate category updates
    pub async fn categories(&self, store: &dyn PluginStore) -> Result<Arc<Vec<Category>>> {
        self.categories
            .try_get_with((), async {
                debug!("Loading categories");
                Ok::<_, PlugdirError>(Arc::new(store.list_categories().await?))
            })
            .await
            .map_err(unshare)
    }

    /// Category list served by `/categories`
    pub async fn category_list(&self, store: &dyn PluginStore) -> Result<Arc<Vec<Category>>> {
        self.category_list
            .try_get_with((), async {
                Ok::<_, PlugdirError>(Arc::new(store.list_categories().await?))
            })
            .await
            .map_err(unshare)
    }

    /// Tag list served by `/tags`
    pub async fn tag_list(&self, store: &dyn PluginStore) -> Result<Arc<Vec<Tag>>> {
        self.tag_list
            .try_get_with(self.generation(), async {
                debug!("Loading tag counts");
                Ok::<_, PlugdirError>(Arc::new(store.list_tags().await?))
            })
            .await
            .map_err(unshare)
    }

    /// Whether a `/plugins` response for these parameters may be cached
    ///
    /// Only unfiltered listings of the first few pages qualify.
    pub fn is_cacheable(&self, query: &str, page: usize) -> bool {
        query.is_empty() && (1..=self.response_cache_max_page).contains(&page)
    }

    pub async fn cached_page(
        &self,
        generation: u64,
        query: &str,
        page: usize,
    ) -> Option<Arc<SearchPage>> {
        if !self.is_cacheable(query, page) {
            return None;
        }
        self.responses
            .get(&ResponseKey::new(generation, query, page))
            .await
    }

    /// Remember a rendered page if its parameters are cacheable
    ///
    /// Pages rendered from a generation that has since been retired are
    /// dropped.
    pub async fn store_page(
        &self,
        generation: u64,
        query: &str,
        page: usize,
        result: Arc<SearchPage>,
    ) {
        if !self.is_cacheable(query, page) {
            return;
        }
        if generation != self.generation() {
            debug!("Discarding page rendered from retired generation {}", generation);
            return;
        }
        self.responses
            .insert(ResponseKey::new(generation, query, page), result)
            .await;
    }

    /// Drop everything derived from plugin records
    ///
    /// Called after a plugin's category or tags change so the next request
    /// sees the edit. Category reference lists are left alone.
    pub async fn invalidate_plugins(&self) {
        let retired = self.generation.fetch_add(1, Ordering::AcqRel);
        self.snapshot.invalidate_all();
        self.tag_list.invalidate_all();
        self.responses.invalidate_all();
        self.responses.run_pending_tasks().await;
        debug!("Invalidated plugin caches (retired generation {})", retired);
    }

    /// Number of cached `/plugins` responses
    pub async fn response_count(&self) -> u64 {
        self.responses.run_pending_tasks().await;
        self.responses.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use plugdir_core::search::SearchEngine;
    use plugdir_core::store::MemoryStore;
    use plugdir_core::types::Plugin;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts snapshot loads and can be told to fail
    struct CountingStore {
        inner: MemoryStore,
        loads: AtomicUsize,
        fail: bool,
    }

    impl CountingStore {
        fn new(fail: bool) -> Self {
            let inner = MemoryStore::new();
            Self {
                inner,
                loads: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl PluginStore for CountingStore {
        async fn get_search_index(&self) -> Result<Vec<Plugin>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            let plugins = self.inner.get_search_index().await;
            tokio::time::sleep(Duration::from_millis(50)).await;
            if self.fail {
                return Err(PlugdirError::database("store offline"));
            }
            plugins
        }

        async fn get_plugin(&self, slug: &str) -> Result<Option<Plugin>> {
            self.inner.get_plugin(slug).await
        }

        async fn upsert_plugin(&self, plugin: Plugin) -> Result<()> {
            self.inner.upsert_plugin(plugin).await
        }

        async fn update_category(&self, slug: &str, category: &str) -> Result<Plugin> {
            self.inner.update_category(slug, category).await
        }

        async fn update_tags(&self, slug: &str, tags: BTreeSet<String>) -> Result<Plugin> {
            self.inner.update_tags(slug, tags).await
        }

        async fn list_categories(&self) -> Result<Vec<Category>> {
            self.inner.list_categories().await
        }

        async fn list_tags(&self) -> Result<Vec<Tag>> {
            self.inner.list_tags().await
        }
    }

    #[tokio::test]
    async fn test_concurrent_misses_load_once() {
        let store = Arc::new(CountingStore::new(false));
        store
            .upsert_plugin(Plugin::new("fugitive", "vim-fugitive"))
            .await
            .unwrap();
        let cache = Arc::new(CatalogCache::new(&CacheConfig::default()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let store = store.clone();
                tokio::spawn(async move { cache.snapshot(store.as_ref()).await.unwrap().len() })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 1);
        }
        assert_eq!(store.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let store = CountingStore::new(true);
        let cache = CatalogCache::new(&CacheConfig::default());

        assert!(cache.snapshot(&store).await.is_err());
        assert!(cache.snapshot(&store).await.is_err());
        assert_eq!(store.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_rebuild() {
        let store = CountingStore::new(false);
        let cache = CatalogCache::new(&CacheConfig::default());

        let first = cache.snapshot(&store).await.unwrap();
        assert!(first.is_empty());

        store
            .upsert_plugin(Plugin::new("ale", "ale"))
            .await
            .unwrap();
        assert!(cache.snapshot(&store).await.unwrap().is_empty());

        cache.invalidate_plugins().await;
        assert_eq!(cache.snapshot(&store).await.unwrap().len(), 1);
        assert_eq!(store.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_snapshot_expires_after_ttl() {
        let store = CountingStore::new(false);
        let config = CacheConfig {
            search_index_ttl_seconds: 1,
            ..Default::default()
        };
        let cache = CatalogCache::new(&config);

        cache.snapshot(&store).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        cache.snapshot(&store).await.unwrap();
        assert_eq!(store.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_only_unfiltered_early_pages_are_cached() {
        let cache = CatalogCache::new(&CacheConfig::default());
        let page = Arc::new(SearchPage::empty());

        let generation = cache.generation();

        cache.store_page(generation, "", 1, page.clone()).await;
        cache.store_page(generation, "", 10, page.clone()).await;
        cache.store_page(generation, "", 11, page.clone()).await;
        cache.store_page(generation, "", 0, page.clone()).await;
        cache.store_page(generation, "tag:git", 1, page.clone()).await;

        assert_eq!(cache.response_count().await, 2);
        assert!(cache.cached_page(generation, "", 1).await.is_some());
        assert!(cache.cached_page(generation, "", 11).await.is_none());
        assert!(cache.cached_page(generation, "tag:git", 1).await.is_none());

        cache.invalidate_plugins().await;
        assert_eq!(cache.response_count().await, 0);
    }

    #[tokio::test]
    async fn test_load_in_flight_during_invalidate_is_not_served() {
        let store = Arc::new(CountingStore::new(false));
        store
            .upsert_plugin(Plugin::new("ale", "ale").with_tags(["old"]))
            .await
            .unwrap();
        let cache = Arc::new(CatalogCache::new(&CacheConfig::default()));

        let listing = {
            let cache = cache.clone();
            let store = store.clone();
            tokio::spawn(async move {
                let generation = cache.generation();
                let snapshot = cache.snapshot_at(generation, store.as_ref()).await.unwrap();
                let page = Arc::new(SearchEngine::default().search(&snapshot, "", 1));
                cache.store_page(generation, "", 1, page.clone()).await;
                page
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        store
            .update_tags("ale", BTreeSet::from(["new".to_string()]))
            .await
            .unwrap();
        cache.invalidate_plugins().await;

        let stale = listing.await.unwrap();
        assert!(stale.plugins[0].tags.contains("old"));

        let generation = cache.generation();
        assert!(cache.cached_page(generation, "", 1).await.is_none());
        assert_eq!(cache.response_count().await, 0);

        let fresh = cache.snapshot(store.as_ref()).await.unwrap();
        assert!(fresh.plugins()[0].tags.contains("new"));
        assert_eq!(store.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_tag_list_follows_invalidation() {
        let store = CountingStore::new(false);
        store
            .upsert_plugin(Plugin::new("ale", "ale").with_tags(["lint"]))
            .await
            .unwrap();
        let cache = CatalogCache::new(&CacheConfig::default());

        assert_eq!(cache.tag_list(&store).await.unwrap().len(), 1);
        store
            .update_tags("ale", BTreeSet::from(["lint".to_string(), "async".to_string()]))
            .await
            .unwrap();
        assert_eq!(cache.tag_list(&store).await.unwrap().len(), 1);

        cache.invalidate_plugins().await;
        assert_eq!(cache.tag_list(&store).await.unwrap().len(), 2);
    }
}
