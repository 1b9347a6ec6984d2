//! Plugdir Infrastructure Library
//!
//! Infrastructure components for the Plugdir service: global logger setup
//! and the outbound chat notifier used when plugins are submitted.

pub mod logger;
pub mod notifier;

pub use logger::*;
pub use notifier::*;

/// Infrastructure version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
