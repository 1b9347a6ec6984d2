//! Search command implementation

use clap::Args;
use plugdir_core::search::{SearchEngine, SearchSnapshot};
use plugdir_core::store;
use plugdir_core::{PlugdirError, Result};

use crate::commands::{CliCommand, CommandContext};
use crate::output::OutputFormatter;

/// Search the configured plugin store
///
/// Accepts the same query syntax as the HTTP API: `cat:<id>` and
/// `tag:<id>` filters mixed with free keywords.
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Query terms, joined with spaces
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub query: Vec<String>,

    /// Result page (1-indexed)
    #[arg(short, long, default_value = "1")]
    pub page: usize,
}

impl SearchCommand {
    pub fn query_string(&self) -> String {
        self.query.join(" ")
    }
}

impl CliCommand for SearchCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let stores = store::open(&ctx.config.database).await?;
        let plugins = stores.plugins.get_search_index().await?;
        let snapshot = SearchSnapshot::new(plugins);

        let engine = SearchEngine::new(ctx.config.cache.keyword_pattern_capacity);
        let query = self.query_string();
        let page = engine.search(&snapshot, &query, self.page);

        tracing::info!(
            "Query {:?} matched {} of {} plugins",
            query,
            page.total_results,
            snapshot.len()
        );

        OutputFormatter::stdout(ctx.output).search_page(&page, self.page)
    }

    fn name(&self) -> &'static str {
        "search"
    }

    fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(PlugdirError::validation("Page numbers start at 1"));
        }
        Ok(())
    }
}
