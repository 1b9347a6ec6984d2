//! In-memory store
//!
//! Keeps plugins in slug order so snapshots have a stable natural order.
//! Submissions keep insertion order.

use crate::store::{PluginStore, SubmissionStore};
use crate::types::{Category, Plugin, SubmissionId, SubmittedPlugin, Tag};
use crate::{PlugdirError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Initial contents for a [`MemoryStore`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub plugins: Vec<Plugin>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Store backed by process memory
#[derive(Default)]
pub struct MemoryStore {
    plugins: RwLock<BTreeMap<String, Plugin>>,
    categories: RwLock<Vec<Category>>,
    submissions: RwLock<Vec<SubmittedPlugin>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given seed data
    ///
    /// Keywords of every seeded plugin are recomputed.
    pub fn with_seed(seed: SeedData) -> Self {
        let plugins = seed
            .plugins
            .into_iter()
            .map(|mut plugin| {
                plugin.refresh_keywords();
                (plugin.slug.clone(), plugin)
            })
            .collect();

        Self {
            plugins: RwLock::new(plugins),
            categories: RwLock::new(seed.categories),
            submissions: RwLock::new(Vec::new()),
        }
    }

    /// Load seed data from a JSON file
    pub fn from_seed_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let seed: SeedData = serde_json::from_str(&content)?;
        Ok(Self::with_seed(seed))
    }

    fn modify_plugin<F>(&self, slug: &str, apply: F) -> Result<Plugin>
    where
        F: FnOnce(&mut Plugin),
    {
        let mut plugins = self.plugins.write();
        let plugin = plugins
            .get_mut(slug)
            .ok_or_else(|| PlugdirError::not_found(format!("plugin {}", slug)))?;
        apply(plugin);
        Ok(plugin.clone())
    }
}

#[async_trait]
impl PluginStore for MemoryStore {
    async fn get_search_index(&self) -> Result<Vec<Plugin>> {
        Ok(self.plugins.read().values().cloned().collect())
    }

    async fn get_plugin(&self, slug: &str) -> Result<Option<Plugin>> {
        Ok(self.plugins.read().get(slug).cloned())
    }

    async fn upsert_plugin(&self, mut plugin: Plugin) -> Result<()> {
        plugin.refresh_keywords();
        self.plugins.write().insert(plugin.slug.clone(), plugin);
        Ok(())
    }

    async fn update_category(&self, slug: &str, category: &str) -> Result<Plugin> {
        self.modify_plugin(slug, |plugin| plugin.category = Some(category.to_string()))
    }

    async fn update_tags(&self, slug: &str, tags: BTreeSet<String>) -> Result<Plugin> {
        self.modify_plugin(slug, |plugin| plugin.set_tags(tags))
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.read().clone())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for plugin in self.plugins.read().values() {
            for tag in &plugin.tags {
                *counts.entry(tag.clone()).or_default() += 1;
            }
        }

        Ok(counts
            .into_iter()
            .map(|(id, count)| Tag { id, count })
            .collect())
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn insert_submission(&self, submission: SubmittedPlugin) -> Result<()> {
        self.submissions.write().push(submission);
        Ok(())
    }

    async fn count_with_link(&self, link: &str) -> Result<usize> {
        Ok(self
            .submissions
            .read()
            .iter()
            .filter(|s| s.vimorg_link.as_deref() == Some(link))
            .count())
    }

    async fn list_pending(&self) -> Result<Vec<SubmittedPlugin>> {
        let mut pending: Vec<SubmittedPlugin> = self
            .submissions
            .read()
            .iter()
            .filter(|s| s.is_pending())
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(pending)
    }

    async fn get_submission(&self, id: SubmissionId) -> Result<Option<SubmittedPlugin>> {
        Ok(self.submissions.read().iter().find(|s| s.id == id).cloned())
    }

    async fn delete_submission(&self, id: SubmissionId) -> Result<bool> {
        let mut submissions = self.submissions.write();
        let before = submissions.len();
        submissions.retain(|s| s.id != id);
        Ok(submissions.len() != before)
    }

    async fn approve_submission(&self, id: SubmissionId) -> Result<bool> {
        let mut submissions = self.submissions.write();
        match submissions.iter_mut().find(|s| s.id == id) {
            Some(submission) => {
                submission.approved = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
