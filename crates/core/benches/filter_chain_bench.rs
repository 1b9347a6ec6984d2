//! Benchmarks for the search filter chain
//!
//! Measures full query evaluation over synthetic catalogs:
//! - Category and tag filtering
//! - Keyword matching with a warm pattern cache
//! - Keyword matching with a fresh pattern per query
//!
//! Run with: cargo bench --package plugdir-core --bench filter_chain_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use plugdir_core::search::{compile_keyword_pattern, SearchEngine, SearchSnapshot};
use plugdir_core::types::Plugin;

const CATEGORIES: &[&str] = &["language", "interface", "integration", "command", "other"];
const TAGS: &[&str] = &["git", "python", "syntax", "motion", "completion", "linter"];

fn synthetic_snapshot(size: usize) -> SearchSnapshot {
    let plugins = (0..size)
        .map(|i| {
            Plugin::new(format!("plugin-{}", i), format!("vim-plugin-{}", i))
                .with_category(CATEGORIES[i % CATEGORIES.len()])
                .with_tags([TAGS[i % TAGS.len()], TAGS[(i / 2) % TAGS.len()]])
                .with_author(format!("author{}", i % 50))
                .with_description(format!(
                    "Plugin number {} providing {} support for editing",
                    i,
                    TAGS[i % TAGS.len()]
                ))
        })
        .collect();
    SearchSnapshot::new(plugins)
}

fn bench_structured_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("structured_filters");

    for size in [1_000, 5_000, 20_000] {
        let snapshot = synthetic_snapshot(size);
        let engine = SearchEngine::default();
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("category", size), &snapshot, |b, s| {
            b.iter(|| engine.search(black_box(s), black_box("cat:language cat:interface"), 1))
        });

        group.bench_with_input(BenchmarkId::new("tags", size), &snapshot, |b, s| {
            b.iter(|| engine.search(black_box(s), black_box("tag:git tag:python"), 1))
        });
    }

    group.finish();
}

fn bench_keyword_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyword_filters");
    let snapshot = synthetic_snapshot(5_000);
    let engine = SearchEngine::default();

    group.bench_function("warm_cache", |b| {
        b.iter(|| engine.search(black_box(&snapshot), black_box("editing support"), 1))
    });

    group.bench_function("full_pipeline", |b| {
        b.iter(|| {
            engine.search(
                black_box(&snapshot),
                black_box("cat:language tag:syntax plugin edit"),
                2,
            )
        })
    });

    group.bench_function("compile_pattern", |b| {
        let tokens = vec!["editing".to_string(), "support".to_string()];
        b.iter(|| compile_keyword_pattern(black_box(&tokens)))
    });

    group.finish();
}

criterion_group!(benches, bench_structured_filters, bench_keyword_filters);
criterion_main!(benches);
