//! Logging infrastructure for Plugdir
//!
//! Sets up the global `tracing` subscriber. Configuration comes either from
//! the `logging` section of [`PlugdirConfig`](plugdir_core::PlugdirConfig)
//! or from `PLUGDIR_LOG_*` environment variables.

use plugdir_core::config::LoggingConfig;
use plugdir_core::{PlugdirError, Result};
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Crates whose chatter is capped at `warn`
const QUIET_TARGETS: &[&str] = &["hyper=warn", "reqwest=warn", "h2=warn", "sqlx=warn"];

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to use JSON format
    pub json_format: bool,
    /// Whether to include timestamps
    pub with_timestamps: bool,
    /// Whether to include file/line information
    pub with_file_info: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_timestamps: true,
            with_file_info: false,
        }
    }
}

impl From<&LoggingConfig> for LoggerConfig {
    fn from(config: &LoggingConfig) -> Self {
        Self {
            level: config.level.clone(),
            json_format: config.json,
            ..Default::default()
        }
    }
}

fn directive(raw: &str) -> Result<Directive> {
    raw.parse()
        .map_err(|e| PlugdirError::validation(format!("Invalid log directive '{}': {}", raw, e)))
}

/// Initialize the global logger with the given configuration
///
/// Events go to stderr so command output on stdout stays parseable.
/// `RUST_LOG` directives are honored on top of the configured level.
pub fn init_logger(config: LoggerConfig) -> Result<()> {
    let level = LogLevel::parse(&config.level)?;

    let mut env_filter = EnvFilter::from_default_env().add_directive(level.into());
    for target in QUIET_TARGETS {
        env_filter = env_filter.add_directive(directive(target)?);
    }

    let fmt_layer = if config.json_format {
        fmt::layer()
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_file(config.with_file_info)
            .with_line_number(config.with_file_info)
            .boxed()
    } else {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(config.with_file_info)
            .with_line_number(config.with_file_info);

        if config.with_timestamps {
            layer.boxed()
        } else {
            layer.without_time().boxed()
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| PlugdirError::invalid_state(format!("Failed to initialize logger: {}", e)))?;

    tracing::info!("Logger initialized with level: {}", config.level);
    Ok(())
}

/// Initialize logger for testing (reduces noise)
pub fn init_test_logger() {
    let config = LoggerConfig {
        level: "warn".to_string(),
        with_timestamps: false,
        ..Default::default()
    };

    // Already initialized by another test
    let _ = init_logger(config);
}

/// Create a logger configuration from environment variables
///
/// Reads `PLUGDIR_LOG_LEVEL`, `PLUGDIR_LOG_JSON`, `PLUGDIR_LOG_TIMESTAMPS`
/// and `PLUGDIR_LOG_FILE_INFO`, falling back to `base` for anything unset
/// or unparsable.
pub fn logger_config_from_env(base: LoggerConfig) -> LoggerConfig {
    let flag = |name: &str, default: bool| {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    };

    LoggerConfig {
        level: std::env::var("PLUGDIR_LOG_LEVEL").unwrap_or(base.level),
        json_format: flag("PLUGDIR_LOG_JSON", base.json_format),
        with_timestamps: flag("PLUGDIR_LOG_TIMESTAMPS", base.with_timestamps),
        with_file_info: flag("PLUGDIR_LOG_FILE_INFO", base.with_file_info),
    }
}

/// Log level utilities
pub struct LogLevel;

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level: &str) -> Result<Level> {
        Level::from_str(level)
            .map_err(|e| PlugdirError::validation(format!("Invalid log level '{}': {}", level, e)))
    }

    /// Get all available log levels
    pub fn all_levels() -> Vec<&'static str> {
        vec!["trace", "debug", "info", "warn", "error"]
    }

    /// Check if a log level string is valid
    pub fn is_valid(level: &str) -> bool {
        Self::all_levels().contains(&level.to_lowercase().as_str())
    }
}
