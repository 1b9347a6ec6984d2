//! Filter stages of the search pipeline
//!
//! Each stage takes the current candidate set and the tokens not yet
//! consumed, drops the plugins that fail its test and hands the rest on.
//! Stages never fail: a token that matches nothing simply empties the set.

use crate::search::keywords::KeywordPatternCache;
use crate::search::query::{take_prefixed, CATEGORY_PREFIX, TAG_PREFIX};
use crate::types::Plugin;

/// Consume `cat:<id>` tokens and keep plugins whose category is any of them
///
/// # Arguments
///
/// * `results` - Candidate plugins
/// * `tokens` - Tokens not yet consumed by an earlier stage
///
/// # Returns
///
/// The narrowed candidates and the tokens this stage did not recognize
pub fn apply_category_filters<'a>(
    results: Vec<&'a Plugin>,
    tokens: Vec<String>,
) -> (Vec<&'a Plugin>, Vec<String>) {
    let (category_ids, tokens) = take_prefixed(tokens, CATEGORY_PREFIX);

    if category_ids.is_empty() {
        return (results, tokens);
    }

    let results = results
        .into_iter()
        .filter(|plugin| {
            plugin
                .category
                .as_ref()
                .is_some_and(|category| category_ids.contains(category))
        })
        .collect();

    (results, tokens)
}

/// Consume `tag:<id>` tokens and keep plugins carrying every one of them
///
/// # Arguments
///
/// * `results` - Candidate plugins
/// * `tokens` - Tokens not yet consumed by an earlier stage
///
/// # Returns
///
/// The narrowed candidates and the tokens this stage did not recognize
pub fn apply_tag_filters<'a>(
    results: Vec<&'a Plugin>,
    tokens: Vec<String>,
) -> (Vec<&'a Plugin>, Vec<String>) {
    let (required_tags, tokens) = take_prefixed(tokens, TAG_PREFIX);

    if required_tags.is_empty() {
        return (results, tokens);
    }

    let results = results
        .into_iter()
        .filter(|plugin| required_tags.iter().all(|tag| plugin.tags.contains(tag)))
        .collect();

    (results, tokens)
}

/// Keep plugins whose keywords contain a word-prefix match for every token
///
/// An empty token list leaves the candidates untouched.
pub fn apply_keyword_filters<'a>(
    results: Vec<&'a Plugin>,
    tokens: &[String],
    patterns: &KeywordPatternCache,
) -> Vec<&'a Plugin> {
    if tokens.is_empty() {
        return results;
    }

    match patterns.get(tokens) {
        Some(regex) => results
            .into_iter()
            .filter(|plugin| regex.is_match(&plugin.keywords))
            .collect(),
        None => Vec::new(),
    }
}
