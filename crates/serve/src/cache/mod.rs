//! Caching module for Plugdir serve crate
//!
//! Holds the search snapshot, reference lists and cached `/plugins`
//! responses shared by all request handlers.

pub mod catalog_cache;

pub use catalog_cache::{CatalogCache, ResponseKey};
