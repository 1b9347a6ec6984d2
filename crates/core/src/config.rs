//! Configuration types for Plugdir
//!
//! Configuration is read from an optional YAML or JSON file and then
//! overridden by `PLUGDIR__`-prefixed environment variables, with `__`
//! separating nested keys (`PLUGDIR__SERVER__PORT=8080`).

use crate::{PlugdirError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "PLUGDIR";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlugdirConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,
    /// Storage settings
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Cache lifetimes
    #[serde(default)]
    pub cache: CacheConfig,
    /// Submission notification settings
    #[serde(default)]
    pub notify: NotifyConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
    /// Maximum request body size in bytes
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
    /// Bearer tokens accepted on moderation routes; empty leaves them open
    #[serde(default)]
    pub moderator_keys: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            max_request_size: default_max_request_size(),
            moderator_keys: Vec::new(),
        }
    }
}

/// Storage settings
///
/// Without a `url` the service runs on an in-memory store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// JSON file to seed the in-memory store from
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            seed_file: None,
        }
    }
}

/// Cache lifetimes in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of the search index snapshot
    #[serde(default = "default_search_index_ttl")]
    pub search_index_ttl_seconds: u64,
    /// Lifetime of the category list used for validation
    #[serde(default = "default_categories_ttl")]
    pub categories_ttl_seconds: u64,
    /// Lifetime of the `/tags` and `/categories` responses
    #[serde(default = "default_reference_ttl")]
    pub reference_ttl_seconds: u64,
    /// Lifetime of cached `/plugins` responses
    #[serde(default = "default_response_ttl")]
    pub response_ttl_seconds: u64,
    /// Highest page number whose unfiltered listing is cached
    #[serde(default = "default_response_cache_max_page")]
    pub response_cache_max_page: usize,
    /// Number of compiled keyword patterns kept
    #[serde(default = "default_pattern_capacity")]
    pub keyword_pattern_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            search_index_ttl_seconds: default_search_index_ttl(),
            categories_ttl_seconds: default_categories_ttl(),
            reference_ttl_seconds: default_reference_ttl(),
            response_ttl_seconds: default_response_ttl(),
            response_cache_max_page: default_response_cache_max_page(),
            keyword_pattern_capacity: default_pattern_capacity(),
        }
    }
}

/// Chat webhook notified on each new submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Webhook endpoint; notifications are disabled when unset
    #[serde(default)]
    pub webhook_url: Option<Url>,
    /// Bearer token sent with each notification
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
    /// Sender name shown in the chat room
    #[serde(default = "default_sender")]
    pub sender: String,
    #[serde(default = "default_notify_timeout")]
    pub timeout_seconds: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            token: None,
            room_id: None,
            sender: default_sender(),
            timeout_seconds: default_notify_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_max_request_size() -> usize {
    1024 * 1024
}

fn default_max_connections() -> u32 {
    10
}

fn default_search_index_ttl() -> u64 {
    26 * 60 * 60
}

fn default_categories_ttl() -> u64 {
    27 * 60 * 60
}

fn default_reference_ttl() -> u64 {
    60 * 60
}

fn default_response_ttl() -> u64 {
    25 * 60 * 60
}

fn default_response_cache_max_page() -> usize {
    10
}

fn default_pattern_capacity() -> u64 {
    1_000
}

fn default_sender() -> String {
    "Plugdir".to_string()
}

fn default_notify_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl PlugdirConfig {
    /// Load configuration from an optional file plus environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(PlugdirError::not_found(format!(
                    "configuration file {}",
                    path.display()
                )));
            }
            builder = builder.add_source(config::File::from(path));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.moderator_keys")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(Some(path.as_ref()))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(PlugdirError::validation("Server port cannot be 0"));
        }

        if self.server.max_request_size == 0 {
            return Err(PlugdirError::validation("Max request size cannot be 0"));
        }

        if self.database.max_connections == 0 {
            return Err(PlugdirError::validation(
                "Database max_connections cannot be 0",
            ));
        }

        let cache = &self.cache;
        let ttls = [
            ("search_index_ttl_seconds", cache.search_index_ttl_seconds),
            ("categories_ttl_seconds", cache.categories_ttl_seconds),
            ("reference_ttl_seconds", cache.reference_ttl_seconds),
            ("response_ttl_seconds", cache.response_ttl_seconds),
        ];
        for (name, ttl) in ttls {
            if ttl == 0 {
                return Err(PlugdirError::validation(format!(
                    "Cache {} cannot be 0",
                    name
                )));
            }
        }

        if let Some(url) = &self.notify.webhook_url {
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(PlugdirError::validation(
                    "Webhook URL must use http or https scheme",
                ));
            }
        }

        if self.notify.timeout_seconds == 0 {
            return Err(PlugdirError::validation("Notify timeout cannot be 0"));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(PlugdirError::validation(format!(
                "Invalid log level: {}. Valid levels: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}
