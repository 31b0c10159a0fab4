//! templatemail - mail template editor
//!
//! CLI entry point for the editor and the headless render/send commands.

use std::collections::VecDeque;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, FromArgMatches};
use eyre::{Context, Result};
use tracing::{debug, info};

use templatemail::cli::{Cli, Command, TemplateSource, generate_after_help, get_log_path};
use templatemail::compose::{Composer, RenderLocation};
use templatemail::config::Config;
use templatemail::dispatch::Dispatcher;
use templatemail::template;
use templatemail::tui;

fn parse_level(s: &str) -> tracing::Level {
    match s.to_uppercase().as_str() {
        "TRACE" => tracing::Level::TRACE,
        "DEBUG" => tracing::Level::DEBUG,
        "INFO" => tracing::Level::INFO,
        "WARN" | "WARNING" => tracing::Level::WARN,
        "ERROR" => tracing::Level::ERROR,
        _ => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
            tracing::Level::INFO
        }
    }
}

/// Start a fresh log file for this run; `keep_existing` appends instead
fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>, keep_existing: bool) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > default (INFO)
    let level = cli_log_level
        .or(config_log_level)
        .map(parse_level)
        .unwrap_or(tracing::Level::INFO);

    let log_file = if keep_existing {
        fs::OpenOptions::new().create(true).append(true).open(&log_path)
    } else {
        fs::File::create(&log_path)
    }
    .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Logs go to a file so they never draw over the editor. `tm logs` must not
    // truncate the log it is about to show.
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    let keep_existing = matches!(cli.command, Some(Command::Logs { .. }));
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref(), keep_existing)
        .context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(location) = cli.render_location {
        debug!(%location, "main: render location overridden on command line");
        config.render_location = location;
    }

    info!(
        "templatemail loaded config: render-location={}, endpoint={}",
        config.render_location, config.dispatch.endpoint
    );

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None | Some(Command::Tui) => cmd_tui(&config).await,
        Some(Command::Render { source }) => cmd_render(&config, &source),
        Some(Command::Send { source }) => cmd_send(&config, &source).await,
        Some(Command::Check { source }) => cmd_check(&config, &source),
        Some(Command::Logs { lines }) => cmd_logs(lines),
    }
}

fn build_composer(config: &Config) -> Result<Composer> {
    let dispatcher = Dispatcher::http(&config.dispatch.endpoint).context("Failed to set up dispatcher")?;
    Ok(Composer::new(config.render_location, config.render_context(), dispatcher))
}

fn flush_timeout(config: &Config) -> Duration {
    Duration::from_millis(config.dispatch.flush_timeout_ms)
}

/// Launch the editor
async fn cmd_tui(config: &Config) -> Result<()> {
    let composer = build_composer(config)?;
    tui::run(composer, config.initial_template(), flush_timeout(config)).await
}

/// Render locally and print
fn cmd_render(config: &Config, source: &TemplateSource) -> Result<()> {
    let text = source.read(&config.initial_template())?;
    let rendered = template::render(&text, &config.render_context()).context("Failed to render template")?;
    println!("{}", rendered);
    Ok(())
}

/// Send once without the editor
///
/// Transport failures are not reported; only a template that fails to render
/// makes this command fail.
async fn cmd_send(config: &Config, source: &TemplateSource) -> Result<()> {
    let text = source.read(&config.initial_template())?;
    let composer = build_composer(config)?;
    composer.send(&text).context("Failed to prepare mail")?;
    composer.dispatcher().flush(flush_timeout(config)).await;
    println!("Sent to {} (rendered by {})", composer.dispatcher().endpoint(), config.render_location);
    Ok(())
}

/// List referenced identifiers and whether the context binds them
fn cmd_check(config: &Config, source: &TemplateSource) -> Result<()> {
    let text = source.read(&config.initial_template())?;
    let refs = template::references(&text).context("Template is malformed")?;
    let context = config.render_context();

    if refs.is_empty() {
        println!("No placeholders");
    }

    for ident in &refs {
        match context.get(ident) {
            Some(value) => println!("  \u{2705} {:<20} {:?}", ident, value),
            None if config.render_location == RenderLocation::Server => {
                println!("  \u{2796} {:<20} not bound here (rendered by the server)", ident)
            }
            None => println!("  \u{274C} {:<20} not bound", ident),
        }
    }

    if context.is_empty() {
        return Ok(());
    }
    let unused: Vec<(&str, &str)> = context
        .iter()
        .filter(|(ident, _)| !refs.iter().any(|r| r.as_str() == *ident))
        .collect();
    if !unused.is_empty() {
        println!("Unused values:");
        for (ident, value) in unused {
            println!("  {:<23} {:?}", ident, value);
        }
    }
    Ok(())
}

/// Show the tail of the log file
fn cmd_logs(lines: usize) -> Result<()> {
    let log_path: PathBuf = get_log_path();
    if !log_path.exists() {
        println!("No log file found at: {}", log_path.display());
        return Ok(());
    }

    let file = fs::File::open(&log_path).context("Failed to open log file")?;
    for line in tail_lines(BufReader::new(file), lines)? {
        println!("{}", line);
    }
    Ok(())
}

/// Last `n` lines of a reader, holding at most `n` in memory
fn tail_lines(reader: impl BufRead, n: usize) -> std::io::Result<VecDeque<String>> {
    let mut tail = VecDeque::new();
    if n == 0 {
        return Ok(tail);
    }
    for line in reader.lines() {
        if tail.len() == n {
            tail.pop_front();
        }
        tail.push_back(line?);
    }
    Ok(tail)
}
