//! Plugdir CLI Library
//!
//! Command-line interface components for the Plugdir plugin directory.

use plugdir_core::PlugdirError;

pub mod commands;
pub mod output;

pub use commands::*;
pub use output::*;

/// CLI version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the appropriate exit code for an error
pub fn exit_code_for_error(error: &PlugdirError) -> i32 {
    match error {
        PlugdirError::Validation { .. } | PlugdirError::Config(_) => 2,
        PlugdirError::NotFound { .. } => 3,
        PlugdirError::Network { .. } | PlugdirError::Timeout { .. } => 5,
        PlugdirError::Database { .. } | PlugdirError::Sqlx(_) => 6,
        _ => 1,
    }
}
