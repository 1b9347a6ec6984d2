//! Query tokenization
//!
//! A raw query string is split on whitespace, lowercased and sorted. The
//! sorted sequence doubles as the key of the keyword pattern cache.

use std::collections::HashSet;

/// Prefix of a category filter token, e.g. `cat:language`
pub const CATEGORY_PREFIX: &str = "cat:";

/// Prefix of a tag filter token, e.g. `tag:python`
pub const TAG_PREFIX: &str = "tag:";

/// Split a raw query into sorted lowercase tokens
///
/// # Examples
///
/// ```
/// use plugdir_core::search::query::tokenize;
///
/// assert_eq!(tokenize("  Tag:Git  fugitive "), vec!["fugitive", "tag:git"]);
/// assert!(tokenize("   ").is_empty());
/// ```
pub fn tokenize(query: &str) -> Vec<String> {
    let mut tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    tokens.sort();
    tokens
}

/// Consume every `<prefix><id>` token with a non-empty id.
///
/// Returns the set of extracted ids and the tokens left over, in their
/// original order.
pub fn take_prefixed(tokens: Vec<String>, prefix: &str) -> (HashSet<String>, Vec<String>) {
    let mut ids = HashSet::new();
    let mut remaining = Vec::with_capacity(tokens.len());

    for token in tokens {
        match token.strip_prefix(prefix) {
            Some(id) if !id.is_empty() => {
                ids.insert(id.to_string());
            }
            _ => remaining.push(token),
        }
    }

    (ids, remaining)
}
