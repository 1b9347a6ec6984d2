//! Init command implementation

use clap::Args;
use plugdir_core::{PlugdirConfig, PlugdirError, Result};
use std::path::PathBuf;

use crate::commands::{CliCommand, CommandContext};

/// Write a default configuration file
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Where to write the configuration
    #[arg(default_value = "plugdir.yaml")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

impl CliCommand for InitCommand {
    async fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        if self.path.exists() && !self.force {
            return Err(PlugdirError::validation(format!(
                "{} already exists (use --force to overwrite)",
                self.path.display()
            )));
        }

        PlugdirConfig::default().to_file(&self.path)?;
        println!("Wrote default configuration to {}", self.path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "init"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_writes_loadable_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plugdir.yaml");
        let command = InitCommand {
            path: path.clone(),
            force: false,
        };

        command.execute(&CommandContext::default()).await.unwrap();

        let config = PlugdirConfig::from_file(&path).unwrap();
        assert_eq!(config, PlugdirConfig::default());
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plugdir.yaml");
        std::fs::write(&path, "server:\n  port: 9000\n").unwrap();

        let command = InitCommand {
            path: path.clone(),
            force: false,
        };
        assert!(command.execute(&CommandContext::default()).await.is_err());

        let command = InitCommand { path, force: true };
        assert!(command.execute(&CommandContext::default()).await.is_ok());
    }
}
