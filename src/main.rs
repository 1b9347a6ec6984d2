//! Plugdir - plugin directory catalog and search service
//!
//! Plugdir serves a searchable catalog of editor plugins over HTTP and
//! accepts plugin submissions for moderation.

use clap::{Parser, Subcommand};
use plugdir_cli::{
    exit_code_for_error, execute_command, CommandContext, InitCommand, OutputFormat,
    SearchCommand, ServeCommand, ValidateCommand,
};
use plugdir_core::{PlugdirConfig, PlugdirError};
use plugdir_infra::{init_logger, logger_config_from_env, LoggerConfig};
use std::path::PathBuf;
use tracing::{debug, error};

#[derive(Parser)]
#[command(name = "plugdir")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Plugdir - catalog and search service for a plugin directory")]
#[command(long_about = r#"
Plugdir serves a catalog of editor plugins with a small query language:

    cat:<id>   keep plugins in any of the given categories
    tag:<id>   keep plugins carrying all of the given tags
    <word>     keep plugins with a word starting with <word>

Configuration is read from an optional YAML or JSON file and from
PLUGDIR__-prefixed environment variables (PLUGDIR__SERVER__PORT=8080).
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PLUGDIR_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty, global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve(ServeCommand),

    /// Search the configured plugin store
    Search(SearchCommand),

    /// Validate a configuration file
    Validate(ValidateCommand),

    /// Write a default configuration file
    Init(InitCommand),
}

async fn run(cli: Cli) -> plugdir_core::Result<()> {
    // Commands that manage configuration files must not require one
    let config = match &cli.command {
        Commands::Validate(_) | Commands::Init(_) => PlugdirConfig::default(),
        _ => PlugdirConfig::load(cli.config.as_deref())?,
    };

    let mut logger = logger_config_from_env(LoggerConfig::from(&config.logging));
    if cli.verbose {
        logger.level = "debug".to_string();
    }
    init_logger(logger)?;
    debug!("Starting Plugdir v{}", env!("CARGO_PKG_VERSION"));

    let ctx = CommandContext {
        config,
        output: cli.output,
    };

    match cli.command {
        Commands::Serve(command) => execute_command(command, &ctx).await,
        Commands::Search(command) => execute_command(command, &ctx).await,
        Commands::Validate(command) => execute_command(command, &ctx).await,
        Commands::Init(command) => execute_command(command, &ctx).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        report(&e);
        std::process::exit(exit_code_for_error(&e));
    }
}

fn report(e: &PlugdirError) {
    error!(category = %e.category(), "{}", e);
    eprintln!("Error: {}", e);
}
