//! Immutable search index snapshot

use crate::types::Plugin;
use std::sync::Arc;

/// Point-in-time copy of every plugin in storage order
///
/// Cloning is cheap: the plugin list is shared. A snapshot is never
/// mutated; refreshing the index means building a new one and swapping
/// the reference.
#[derive(Debug, Clone)]
pub struct SearchSnapshot {
    plugins: Arc<[Plugin]>,
}

impl SearchSnapshot {
    pub fn new(plugins: Vec<Plugin>) -> Self {
        Self {
            plugins: plugins.into(),
        }
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for SearchSnapshot {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_plugins() {
        let snapshot = SearchSnapshot::new(vec![Plugin::new("a", "A"), Plugin::new("b", "B")]);
        let cloned = snapshot.clone();

        assert_eq!(cloned.len(), 2);
        assert!(std::ptr::eq(snapshot.plugins(), cloned.plugins()));
    }

    #[test]
    fn test_default_is_empty() {
        assert!(SearchSnapshot::default().is_empty());
    }
}
