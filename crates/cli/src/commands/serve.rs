//! Serve command implementation

use clap::Args;
use plugdir_core::{PlugdirConfig, Result};
use plugdir_serve::ServerBuilder;

use crate::commands::{CliCommand, CommandContext};

/// Start the Plugdir HTTP server
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Host address to bind to
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Disable CORS headers
    #[arg(long)]
    pub no_cors: bool,
}

impl ServeCommand {
    /// Apply command line overrides on top of the loaded configuration
    pub fn apply(&self, mut config: PlugdirConfig) -> PlugdirConfig {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = &self.database_url {
            config.database.url = Some(url.clone());
        }
        if self.no_cors {
            config.server.cors_enabled = false;
        }
        config
    }
}

impl CliCommand for ServeCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let config = self.apply(ctx.config.clone());

        tracing::info!("Starting Plugdir server");
        tracing::info!("Host: {}", config.server.host);
        tracing::info!("Port: {}", config.server.port);
        match &config.database.url {
            Some(_) => tracing::info!("Store: PostgreSQL"),
            None => tracing::info!("Store: in-memory"),
        }
        if config.notify.webhook_url.is_none() {
            tracing::info!("Submission notifications disabled");
        }

        let server = ServerBuilder::from_config(config).build().await?;
        server.start().await
    }

    fn name(&self) -> &'static str {
        "serve"
    }
}
