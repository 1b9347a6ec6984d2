//! Validate command implementation

use clap::Args;
use plugdir_core::{PlugdirConfig, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::commands::{CliCommand, CommandContext};
use crate::output::{OutputFormat, OutputFormatter};

/// Check a configuration file
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Configuration file to validate
    pub config: PathBuf,
}

/// Summary printed for a valid configuration
#[derive(Debug, Serialize)]
pub struct ValidationSummary {
    pub path: String,
    pub bind: String,
    pub store: &'static str,
    pub notifications: bool,
    pub moderator_keys: usize,
}

impl ValidationSummary {
    pub fn new(path: &std::path::Path, config: &PlugdirConfig) -> Self {
        Self {
            path: path.display().to_string(),
            bind: format!("{}:{}", config.server.host, config.server.port),
            store: if config.database.url.is_some() {
                "postgres"
            } else {
                "memory"
            },
            notifications: config.notify.webhook_url.is_some(),
            moderator_keys: config.server.moderator_keys.len(),
        }
    }
}

impl CliCommand for ValidateCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let config = PlugdirConfig::from_file(&self.config)?;
        config.validate()?;

        let summary = ValidationSummary::new(&self.config, &config);
        if ctx.output == OutputFormat::Pretty {
            println!("{} is valid", summary.path);
            println!("  bind:            {}", summary.bind);
            println!("  store:           {}", summary.store);
            println!("  notifications:   {}", summary.notifications);
            println!("  moderator keys:  {}", summary.moderator_keys);
            Ok(())
        } else {
            OutputFormatter::stdout(ctx.output).output(&summary)
        }
    }

    fn name(&self) -> &'static str {
        "validate"
    }
}
