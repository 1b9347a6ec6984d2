//! Keyword pattern compilation and caching
//!
//! The keyword stage matches a plugin iff, for each remaining token in
//! sorted order, its `keywords` string has a word starting with that token,
//! with the matches appearing left to right. That is expressed as one regex
//! `\bt1.*\bt2.*...` with every token escaped.

use moka::sync::Cache;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of compiled patterns kept in memory
pub const DEFAULT_PATTERN_CAPACITY: u64 = 1_000;

/// Build the combined keyword pattern for a token sequence
///
/// Returns `None` for an empty sequence or if the pattern exceeds the
/// regex engine's size limits.
pub fn compile_keyword_pattern(tokens: &[String]) -> Option<Regex> {
    if tokens.is_empty() {
        return None;
    }

    let pattern = tokens
        .iter()
        .map(|token| format!(r"\b{}", regex::escape(token)))
        .collect::<Vec<_>>()
        .join(".*");

    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!("Failed to compile keyword pattern for {:?}: {}", tokens, e);
            None
        }
    }
}

/// Bounded cache of compiled keyword patterns keyed by sorted tokens
#[derive(Clone)]
pub struct KeywordPatternCache {
    patterns: Cache<Vec<String>, Option<Arc<Regex>>>,
}

impl KeywordPatternCache {
    /// Create a cache holding at most `capacity` patterns
    pub fn new(capacity: u64) -> Self {
        Self {
            patterns: Cache::new(capacity),
        }
    }

    /// Get the compiled pattern for `tokens`, compiling on first use
    ///
    /// Tokens that cannot be compiled are cached as `None` so they are not
    /// retried on every request.
    pub fn get(&self, tokens: &[String]) -> Option<Arc<Regex>> {
        if let Some(cached) = self.patterns.get(tokens) {
            return cached;
        }

        debug!("Compiling keyword pattern for {} tokens", tokens.len());
        let compiled = compile_keyword_pattern(tokens).map(Arc::new);
        self.patterns.insert(tokens.to_vec(), compiled.clone());
        compiled
    }

    pub fn entry_count(&self) -> u64 {
        self.patterns.run_pending_tasks();
        self.patterns.entry_count()
    }
}

impl Default for KeywordPatternCache {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN_CAPACITY)
    }
}
