//! Persistence collaborators
//!
//! The search engine only needs [`PluginStore::get_search_index`] and
//! [`PluginStore::list_categories`]; the remaining operations back the
//! HTTP API. Two implementations ship with the crate: [`MemoryStore`] for
//! development and tests, and [`PgStore`] on PostgreSQL.

pub mod memory;
pub mod postgres;

pub use memory::{MemoryStore, SeedData};
pub use postgres::PgStore;

use crate::config::DatabaseConfig;
use crate::types::{Category, Plugin, SubmissionId, SubmittedPlugin, Tag};
use crate::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// Access to canonical plugin records and reference data
#[async_trait]
pub trait PluginStore: Send + Sync {
    /// Every plugin in storage order
    async fn get_search_index(&self) -> Result<Vec<Plugin>>;

    async fn get_plugin(&self, slug: &str) -> Result<Option<Plugin>>;

    /// Insert or fully replace a plugin record
    async fn upsert_plugin(&self, plugin: Plugin) -> Result<()>;

    /// Set the plugin's category
    ///
    /// # Errors
    ///
    /// Returns `PlugdirError::NotFound` if no plugin has this slug
    async fn update_category(&self, slug: &str, category: &str) -> Result<Plugin>;

    /// Replace the plugin's tag set
    ///
    /// # Errors
    ///
    /// Returns `PlugdirError::NotFound` if no plugin has this slug
    async fn update_tags(&self, slug: &str, tags: BTreeSet<String>) -> Result<Plugin>;

    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Tags in use with the number of plugins carrying each
    async fn list_tags(&self) -> Result<Vec<Tag>>;
}

/// Access to the submitted plugin moderation queue
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn insert_submission(&self, submission: SubmittedPlugin) -> Result<()>;

    /// Number of submissions already carrying this external link
    async fn count_with_link(&self, link: &str) -> Result<usize>;

    /// Unapproved submissions, newest first
    async fn list_pending(&self) -> Result<Vec<SubmittedPlugin>>;

    async fn get_submission(&self, id: SubmissionId) -> Result<Option<SubmittedPlugin>>;

    /// Returns false if nothing was deleted
    async fn delete_submission(&self, id: SubmissionId) -> Result<bool>;

    /// Returns false if no such submission exists
    async fn approve_submission(&self, id: SubmissionId) -> Result<bool>;
}

/// The pair of stores a running service works against
#[derive(Clone)]
pub struct Stores {
    pub plugins: Arc<dyn PluginStore>,
    pub submissions: Arc<dyn SubmissionStore>,
}

impl Stores {
    /// Both roles served by one store value
    pub fn shared<S>(store: S) -> Self
    where
        S: PluginStore + SubmissionStore + 'static,
    {
        let store = Arc::new(store);
        Self {
            plugins: store.clone(),
            submissions: store,
        }
    }
}

/// Open the stores described by the database configuration
///
/// With a database URL this connects to PostgreSQL and makes sure the
/// schema exists. Without one it falls back to an in-memory store,
/// optionally seeded from a JSON file.
pub async fn open(config: &DatabaseConfig) -> Result<Stores> {
    match &config.url {
        Some(url) => {
            info!("Connecting to PostgreSQL store");
            let store = PgStore::connect(url, config.max_connections).await?;
            store.ensure_schema().await?;
            Ok(Stores::shared(store))
        }
        None => {
            let store = match &config.seed_file {
                Some(path) => {
                    info!("Using in-memory store seeded from {}", path.display());
                    MemoryStore::from_seed_file(path)?
                }
                None => {
                    info!("Using empty in-memory store");
                    MemoryStore::new()
                }
            };
            Ok(Stores::shared(store))
        }
    }
}
