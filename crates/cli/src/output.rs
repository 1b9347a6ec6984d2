//! CLI output formatting module

use clap::ValueEnum;
use plugdir_core::search::SearchPage;
use plugdir_core::Result;
use serde::Serialize;
use std::io::{self, Stdout, Write};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    #[default]
    Pretty,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
            Self::Pretty => write!(f, "pretty"),
        }
    }
}

/// Output formatter for CLI results
pub struct OutputFormatter<W: Write = Stdout> {
    format: OutputFormat,
    writer: W,
}

impl OutputFormatter {
    /// Create a formatter writing to stdout
    pub fn stdout(format: OutputFormat) -> Self {
        Self::with_writer(format, io::stdout())
    }
}

impl<W: Write> OutputFormatter<W> {
    /// Create a formatter with custom writer
    pub fn with_writer(format: OutputFormat, writer: W) -> Self {
        Self { format, writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Format and output a serializable value
    ///
    /// `Pretty` falls back to indented JSON for arbitrary values.
    pub fn output<T: Serialize>(&mut self, value: &T) -> Result<()> {
        match self.format {
            OutputFormat::Json | OutputFormat::Pretty => {
                writeln!(self.writer, "{}", serde_json::to_string_pretty(value)?)?;
            }
            OutputFormat::Yaml => {
                write!(self.writer, "{}", serde_yaml::to_string(value)?)?;
            }
        }
        Ok(())
    }

    /// Output one page of search results
    pub fn search_page(&mut self, page: &SearchPage, page_number: usize) -> Result<()> {
        if self.format != OutputFormat::Pretty {
            return self.output(page);
        }

        if page.plugins.is_empty() {
            writeln!(
                self.writer,
                "No plugins on page {} ({} results)",
                page_number, page.total_results
            )?;
            return Ok(());
        }

        for plugin in &page.plugins {
            let category = plugin.category.as_deref().unwrap_or("-");
            write!(self.writer, "{:<24} {:<32} [{}]", plugin.slug, plugin.name, category)?;
            if !plugin.tags.is_empty() {
                let tags: Vec<&str> = plugin.tags.iter().map(String::as_str).collect();
                write!(self.writer, " {}", tags.join(", "))?;
            }
            writeln!(self.writer)?;
        }

        writeln!(
            self.writer,
            "\nPage {} of {} ({} results)",
            page_number, page.total_pages, page.total_results
        )?;
        Ok(())
    }
}
