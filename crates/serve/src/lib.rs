//! Plugdir Serve Library
//!
//! HTTP API for the Plugdir plugin directory: plugin search and lookup,
//! category and tag editing, plugin submission and moderation.

use plugdir_core::config::ServerSettings;

pub mod api;
pub mod cache;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use error::{ApiError, ErrorResponse};
pub use handlers::AppState;
pub use server::*;

/// Server version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
    pub max_request_size: usize,
    /// Bearer tokens accepted on moderation routes; empty leaves them open
    pub moderator_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig::from(&ServerSettings::default())
    }
}

impl From<&ServerSettings> for ServerConfig {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            cors_enabled: settings.cors_enabled,
            max_request_size: settings.max_request_size,
            moderator_keys: settings.moderator_keys.clone(),
        }
    }
}
