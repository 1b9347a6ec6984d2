//! In-memory plugin search
//!
//! A search request runs a fixed pipeline over a [`SearchSnapshot`]:
//!
//! 1. [`query::tokenize`] splits the raw query into sorted lowercase tokens
//! 2. [`filters::apply_category_filters`] consumes `cat:<id>` tokens (OR)
//! 3. [`filters::apply_tag_filters`] consumes `tag:<id>` tokens (AND)
//! 4. [`filters::apply_keyword_filters`] prefix-matches everything left
//! 5. [`pagination::paginate`] cuts out the requested page
//!
//! Matching is boolean. Results keep snapshot order.
//!
//! # Examples
//!
//! ```
//! use plugdir_core::search::{SearchEngine, SearchSnapshot};
//! use plugdir_core::types::Plugin;
//!
//! let snapshot = SearchSnapshot::new(vec![
//!     Plugin::new("fugitive", "vim-fugitive").with_tags(["git"]),
//!     Plugin::new("jedi", "jedi-vim").with_tags(["python"]),
//! ]);
//!
//! let engine = SearchEngine::default();
//! let page = engine.search(&snapshot, "tag:git", 1);
//! assert_eq!(page.total_results, 1);
//! assert_eq!(page.plugins[0].slug, "fugitive");
//! ```

pub mod filters;
pub mod keywords;
pub mod pagination;
pub mod query;
pub mod snapshot;

pub use filters::{apply_category_filters, apply_keyword_filters, apply_tag_filters};
pub use keywords::{compile_keyword_pattern, KeywordPatternCache};
pub use pagination::{paginate, SearchPage, RESULTS_PER_PAGE};
pub use query::tokenize;
pub use snapshot::SearchSnapshot;

use crate::types::Plugin;
use tracing::debug;

/// Runs the filter chain against snapshots
///
/// Holds the compiled keyword pattern cache; everything else is stateless.
#[derive(Clone, Default)]
pub struct SearchEngine {
    patterns: KeywordPatternCache,
}

impl SearchEngine {
    /// Create an engine whose pattern cache holds `pattern_capacity` entries
    pub fn new(pattern_capacity: u64) -> Self {
        Self {
            patterns: KeywordPatternCache::new(pattern_capacity),
        }
    }

    /// Apply all filter stages for `query` without paginating
    pub fn filter<'a>(&self, plugins: &'a [Plugin], query: &str) -> Vec<&'a Plugin> {
        let results: Vec<&Plugin> = plugins.iter().collect();
        let tokens = tokenize(query);

        if tokens.is_empty() {
            return results;
        }

        let (results, tokens) = apply_category_filters(results, tokens);
        let (results, tokens) = apply_tag_filters(results, tokens);
        let results = apply_keyword_filters(results, &tokens, &self.patterns);

        debug!(
            "Query {:?} matched {} of {} plugins",
            query,
            results.len(),
            plugins.len()
        );
        results
    }

    /// Filter the snapshot for `query` and return the requested 1-indexed page
    pub fn search(&self, snapshot: &SearchSnapshot, query: &str, page: usize) -> SearchPage {
        let results = self.filter(snapshot.plugins(), query);
        paginate(&results, page)
    }

    pub fn patterns(&self) -> &KeywordPatternCache {
        &self.patterns
    }
}
