//! Common test helpers for search integration tests

use plugdir_core::{Plugin, SearchSnapshot};

/// A small catalog covering categories, tags and keyword edge cases
pub fn sample_catalog() -> Vec<Plugin> {
    vec![
        Plugin::new("ale", "ale")
            .with_category("language")
            .with_tags(["linter", "async"])
            .with_author("w0rp")
            .with_description("Asynchronous Lint Engine"),
        Plugin::new("cpp-enhanced", "vim-cpp-enhanced-highlight")
            .with_category("language")
            .with_tags(["c++", "syntax"])
            .with_description("Additional c++ syntax highlighting"),
        Plugin::new("fugitive", "vim-fugitive")
            .with_category("integration")
            .with_tags(["git", "scm"])
            .with_author("Tim Pope")
            .with_description("A Git wrapper so awesome, it should be illegal"),
        Plugin::new("gitgutter", "vim-gitgutter")
            .with_category("interface")
            .with_tags(["git", "diff"])
            .with_description("Shows a git diff in the sign column"),
        Plugin::new("pytest", "pytest.vim")
            .with_category("language")
            .with_tags(["python", "testing"])
            .with_description("Python Testing Framework runner"),
        Plugin::new("uncategorized", "mystery")
            .with_tags(["git"])
            .with_description("Nobody has categorized this yet"),
    ]
}

pub fn sample_snapshot() -> SearchSnapshot {
    SearchSnapshot::new(sample_catalog())
}

/// `count` generic plugins sharing one tag
pub fn numbered_snapshot(count: usize) -> SearchSnapshot {
    SearchSnapshot::new(
        (0..count)
            .map(|i| {
                Plugin::new(format!("plugin-{:03}", i), format!("Plugin {}", i))
                    .with_tags(["bulk"])
            })
            .collect(),
    )
}

pub fn slugs(plugins: &[Plugin]) -> Vec<&str> {
    plugins.iter().map(|p| p.slug.as_str()).collect()
}
