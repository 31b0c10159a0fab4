//! CLI command definitions and subcommands

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use eyre::{Context, Result};
use tracing::debug;

use crate::compose::RenderLocation;

/// templatemail - edit an HTML mail template and send it
#[derive(Parser)]
#[command(
    name = "tm",
    about = "Edit an HTML mail template and send it to a local mail endpoint",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Where placeholders are substituted (overrides config)
    #[arg(short = 'r', long = "render-location", global = true, value_name = "server|client")]
    pub render_location: Option<RenderLocation>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the template editor (default)
    Tui,

    /// Render a template with the configured context and print it
    Render {
        #[command(flatten)]
        source: TemplateSource,
    },

    /// Send a template once without opening the editor
    Send {
        #[command(flatten)]
        source: TemplateSource,
    },

    /// List identifiers a template references and whether they are bound
    Check {
        #[command(flatten)]
        source: TemplateSource,
    },

    /// Show logs
    Logs {
        /// Number of lines to show
        #[arg(short = 'n', long, default_value = "50")]
        lines: usize,
    },
}

/// Where a headless command reads its template from
#[derive(Debug, Clone, Default, Args)]
pub struct TemplateSource {
    /// Template text
    #[arg(short, long, conflicts_with = "file")]
    pub template: Option<String>,

    /// Read the template from a file ("-" for stdin)
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

impl TemplateSource {
    /// Resolve to template text, falling back to `default` when neither flag is given
    pub fn read(&self, default: &str) -> Result<String> {
        debug!(?self, "TemplateSource::read: called");
        if let Some(template) = &self.template {
            return Ok(template.clone());
        }
        match &self.file {
            Some(path) if path.as_os_str() == "-" => {
                debug!("TemplateSource::read: reading stdin");
                std::io::read_to_string(std::io::stdin()).context("Failed to read template from stdin")
            }
            Some(path) => std::fs::read_to_string(path)
                .context(format!("Failed to read template from {}", path.display())),
            None => {
                debug!("TemplateSource::read: using default template");
                Ok(default.to_string())
            }
        }
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("templatemail")
        .join("logs")
        .join("templatemail.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text
pub fn generate_after_help() -> String {
    format!(
        "Keys:\n  Ctrl+S   send mail\n  Tab      switch between editor and send button\n  Esc      quit\n\nLogs are written to: {}\n",
        get_log_path().display()
    )
}
