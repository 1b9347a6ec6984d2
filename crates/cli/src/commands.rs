//! CLI commands module

use crate::output::OutputFormat;
use plugdir_core::{PlugdirConfig, Result};

pub mod init;
pub mod search;
pub mod serve;
pub mod validate;

pub use init::*;
pub use search::*;
pub use serve::*;
pub use validate::*;

/// Settings shared by every command
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    /// Loaded configuration (file plus environment overrides)
    pub config: PlugdirConfig,
    /// Requested output format
    pub output: OutputFormat,
}

/// Base trait for CLI commands
#[allow(async_fn_in_trait)]
pub trait CliCommand {
    /// Execute the command
    async fn execute(&self, ctx: &CommandContext) -> Result<()>;

    /// Get command name for logging
    fn name(&self) -> &'static str;

    /// Validate command arguments
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Common command execution wrapper
pub async fn execute_command<T: CliCommand>(command: T, ctx: &CommandContext) -> Result<()> {
    tracing::debug!("Executing command: {}", command.name());

    command.validate()?;
    command.execute(ctx).await?;

    tracing::debug!("Command {} completed successfully", command.name());
    Ok(())
}
