//! Result pagination

use crate::types::Plugin;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Fixed number of plugins per result page
pub const RESULTS_PER_PAGE: usize = 20;

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub plugins: Vec<Plugin>,
    pub total_pages: usize,
    pub total_results: usize,
    pub results_per_page: usize,
}

impl SearchPage {
    pub fn empty() -> Self {
        Self {
            plugins: Vec::new(),
            total_pages: 0,
            total_results: 0,
            results_per_page: RESULTS_PER_PAGE,
        }
    }
}

/// Number of pages needed for `count` results
pub fn total_pages(count: usize) -> usize {
    count.div_ceil(RESULTS_PER_PAGE)
}

/// Index range of a 1-indexed page, clamped to `count`
///
/// Page 0 and pages past the end yield an empty range.
pub fn page_range(count: usize, page: usize) -> Range<usize> {
    if page == 0 {
        return 0..0;
    }

    let start = (page - 1).saturating_mul(RESULTS_PER_PAGE).min(count);
    let end = page.saturating_mul(RESULTS_PER_PAGE).min(count);
    start..end
}

/// Slice the filtered results into the requested page
pub fn paginate(results: &[&Plugin], page: usize) -> SearchPage {
    let count = results.len();

    SearchPage {
        plugins: results[page_range(count, page)]
            .iter()
            .map(|plugin| (*plugin).clone())
            .collect(),
        total_pages: total_pages(count),
        total_results: count,
        results_per_page: RESULTS_PER_PAGE,
    }
}
