//! Integration tests for the search pipeline
//!
//! These tests run full queries through `SearchEngine` and check the
//! observable properties of each filter stage and of pagination.

mod common;

use common::{numbered_snapshot, sample_catalog, sample_snapshot, slugs};
use plugdir_core::{SearchEngine, SearchSnapshot, RESULTS_PER_PAGE};

#[test]
fn test_empty_query_returns_full_snapshot() {
    let engine = SearchEngine::default();
    let snapshot = sample_snapshot();

    for query in ["", "   ", "\t\n"] {
        let page = engine.search(&snapshot, query, 1);
        assert_eq!(page.total_results, snapshot.len());
        assert_eq!(page.plugins, sample_catalog());
    }
}

#[test]
fn test_tag_filter_requires_every_tag() {
    let engine = SearchEngine::default();
    let snapshot = sample_snapshot();

    let page = engine.search(&snapshot, "tag:git", 1);
    assert_eq!(slugs(&page.plugins), vec!["fugitive", "gitgutter", "uncategorized"]);

    let page = engine.search(&snapshot, "tag:git tag:diff", 1);
    assert_eq!(slugs(&page.plugins), vec!["gitgutter"]);

    let page = engine.search(&snapshot, "tag:git tag:python", 1);
    assert_eq!(page.total_results, 0);
}

#[test]
fn test_category_filter_accepts_any_category() {
    let engine = SearchEngine::default();
    let snapshot = sample_snapshot();

    let page = engine.search(&snapshot, "cat:language", 1);
    assert_eq!(slugs(&page.plugins), vec!["ale", "cpp-enhanced", "pytest"]);

    let page = engine.search(&snapshot, "cat:language cat:interface", 1);
    assert_eq!(
        slugs(&page.plugins),
        vec!["ale", "cpp-enhanced", "gitgutter", "pytest"]
    );
}

#[test]
fn test_filter_tokens_are_case_insensitive() {
    let engine = SearchEngine::default();
    let snapshot = sample_snapshot();

    let page = engine.search(&snapshot, "CAT:Integration TAG:Git", 1);
    assert_eq!(slugs(&page.plugins), vec!["fugitive"]);
}

#[test]
fn test_all_three_stages_combine() {
    let engine = SearchEngine::default();
    let snapshot = sample_snapshot();

    let page = engine.search(&snapshot, "wrap cat:integration tag:git", 1);
    assert_eq!(slugs(&page.plugins), vec!["fugitive"]);

    let page = engine.search(&snapshot, "wrap cat:interface tag:git", 1);
    assert_eq!(page.total_results, 0);
}

#[test]
fn test_stages_are_independent() {
    let engine = SearchEngine::default();
    let snapshot = sample_snapshot();

    let combined = engine.filter(snapshot.plugins(), "cat:language tag:syntax c++");
    let by_category = engine.filter(snapshot.plugins(), "cat:language");
    let by_tag = engine.filter(snapshot.plugins(), "tag:syntax");
    let by_keyword = engine.filter(snapshot.plugins(), "c++");

    let intersection: Vec<&str> = by_category
        .iter()
        .filter(|p| by_tag.contains(p) && by_keyword.contains(p))
        .map(|p| p.slug.as_str())
        .collect();
    let combined: Vec<&str> = combined.iter().map(|p| p.slug.as_str()).collect();

    assert_eq!(combined, intersection);
    assert_eq!(combined, vec!["cpp-enhanced"]);
}

#[test]
fn test_keyword_matching_is_prefix_based_and_case_insensitive() {
    let engine = SearchEngine::default();
    let snapshot = sample_snapshot();

    assert_eq!(slugs(&engine.search(&snapshot, "test", 1).plugins), vec!["pytest"]);
    assert_eq!(slugs(&engine.search(&snapshot, "PYTHON", 1).plugins), vec!["pytest"]);
    assert_eq!(engine.search(&snapshot, "estfram", 1).total_results, 0);
}

#[test]
fn test_every_keyword_must_match() {
    let engine = SearchEngine::default();
    let snapshot = sample_snapshot();

    let page = engine.search(&snapshot, "git sign", 1);
    assert_eq!(slugs(&page.plugins), vec!["gitgutter"]);

    let page = engine.search(&snapshot, "git python", 1);
    assert_eq!(page.total_results, 0);
}

#[test]
fn test_keyword_matches_follow_sorted_token_order() {
    let engine = SearchEngine::default();
    let snapshot = sample_snapshot();

    // "shows" sorts before "sign" and also precedes it in the text
    let page = engine.search(&snapshot, "sign shows", 1);
    assert_eq!(slugs(&page.plugins), vec!["gitgutter"]);

    // "column" sorts before "diff" but every "diff" precedes "column"
    let page = engine.search(&snapshot, "diff column", 1);
    assert_eq!(page.total_results, 0);
}

#[test]
fn test_keyword_order_ignores_capitalisation() {
    let engine = SearchEngine::default();
    let snapshot = sample_snapshot();

    for query in ["sign shows", "Sign shows", "sign Shows", "SIGN SHOWS"] {
        let page = engine.search(&snapshot, query, 1);
        assert_eq!(slugs(&page.plugins), vec!["gitgutter"], "query {:?}", query);
    }
}

#[test]
fn test_special_characters_are_literal() {
    let engine = SearchEngine::default();
    let snapshot = sample_snapshot();

    let page = engine.search(&snapshot, "c++", 1);
    assert_eq!(slugs(&page.plugins), vec!["cpp-enhanced"]);

    for query in ["(", "[a-z", ".*", "\\", "a|b", "$^"] {
        let page = engine.search(&snapshot, query, 1);
        assert_eq!(page.total_results, 0, "query {:?} should match nothing", query);
    }
}

#[test]
fn test_unknown_filters_match_nothing() {
    let engine = SearchEngine::default();
    let snapshot = sample_snapshot();

    assert_eq!(engine.search(&snapshot, "cat:nonexistent", 1).total_results, 0);
    assert_eq!(engine.search(&snapshot, "tag:nonexistent", 1).total_results, 0);
}

#[test]
fn test_pagination_of_forty_five_results() {
    let engine = SearchEngine::default();
    let snapshot = numbered_snapshot(45);

    let pages: Vec<_> = (1..=4)
        .map(|page| engine.search(&snapshot, "tag:bulk", page))
        .collect();

    assert_eq!(pages[0].plugins.len(), 20);
    assert_eq!(pages[1].plugins.len(), 20);
    assert_eq!(pages[2].plugins.len(), 5);
    assert!(pages[3].plugins.is_empty());

    for page in &pages {
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_results, 45);
        assert_eq!(page.results_per_page, RESULTS_PER_PAGE);
    }

    assert_eq!(pages[2].plugins[4].slug, "plugin-044");
}

#[test]
fn test_empty_snapshot() {
    let engine = SearchEngine::default();
    let snapshot = SearchSnapshot::default();

    for query in ["", "tag:git", "cat:language vim", "c++"] {
        let page = engine.search(&snapshot, query, 1);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.total_results, 0);
        assert!(page.plugins.is_empty());
    }
}
