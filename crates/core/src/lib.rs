//! Plugdir Core Library
//!
//! Core functionality for the Plugdir plugin directory service: the plugin
//! data model, the in-memory search engine, submission moderation and the
//! storage collaborators they run against.

pub mod config;
pub mod error;
pub mod moderation;
pub mod search;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::PlugdirConfig;
pub use error::{ErrorCategory, PlugdirError, Result};
pub use moderation::{ModerationQueue, PluginSubmission, SubmitOutcome};
pub use search::{SearchEngine, SearchPage, SearchSnapshot, RESULTS_PER_PAGE};
pub use store::{MemoryStore, PgStore, PluginStore, Stores, SubmissionStore};
pub use types::{Category, Plugin, SubmissionId, SubmittedPlugin, Tag};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version info as a formatted string
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let _: Result<()> = Ok(());
        let _id = SubmissionId::new();
        let _engine = SearchEngine::default();
    }

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert!(info.contains(VERSION));
        assert!(info.starts_with("plugdir-core"));
    }
}
