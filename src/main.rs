//! Screen Insight command-line entry point.
//!
//! Reads screen text from `--text` or stdin (one request per line) and
//! prints each analysis result as one JSON line on stdout. Logs go to stderr.

use std::collections::VecDeque;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use screen_insight::storage::{write_snapshot, ExportFormat};
use screen_insight::utils::paths::config_path;
use screen_insight::{ActivityCategory, AnalysisHandle, ConfigService, Orchestrator};

#[derive(Parser)]
#[command(name = "screen-insight")]
#[command(about = "Context-aware insights for on-screen text", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.screen-insight/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Analyze this text instead of reading stdin
    #[arg(short, long)]
    text: Option<String>,

    /// Force the activity category (coding, terminal, research, ...)
    #[arg(long)]
    hint: Option<ActivityCategory>,

    /// Write the session snapshot here when done
    #[arg(long)]
    export: Option<PathBuf>,

    /// Export format: json or jsonl
    #[arg(long, default_value = "json")]
    format: ExportFormat,

    /// Print session analytics to stdout when done
    #[arg(long, default_value_t = false)]
    summary: bool,

    /// Check that the configured backend is reachable and exit
    #[arg(long, default_value_t = false)]
    check: bool,

    /// Overwrite the config file with defaults and exit
    #[arg(long, default_value_t = false)]
    reset_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.reset_config {
        let path = match &cli.config {
            Some(path) => path.clone(),
            None => config_path()?,
        };
        let service = ConfigService::reset(&path).context("failed to reset configuration")?;
        println!("config reset: {}", service.path().display());
        return Ok(());
    }

    let service = match &cli.config {
        Some(path) => ConfigService::load(path),
        None => ConfigService::load_default(),
    }
    .context("failed to load configuration")?;
    let config = service.into_config();
    let window = config.analysis.worker_count;

    let engine = Orchestrator::from_config(config).context("failed to start engine")?;

    if cli.check {
        engine
            .backend_health()
            .await
            .context("backend health check failed")?;
        println!("backend ok");
        return Ok(());
    }

    match &cli.text {
        Some(text) => {
            let result = engine.analyze(text, cli.hint).await?;
            println!("{}", serde_json::to_string(&result)?);
        }
        None => run_stdin(&engine, cli.hint, window).await?,
    }

    if let Some(path) = &cli.export {
        let snapshot = engine.export_snapshot();
        let written = write_snapshot(path, &snapshot, cli.format)?;
        tracing::info!(records = written, path = %path.display(), "session exported");
    }

    if cli.summary {
        println!("{}", serde_json::to_string_pretty(&engine.summary())?);
    }

    Ok(())
}

/// Pipeline stdin lines through the engine, keeping up to `window` requests
/// in flight and printing results in input order.
async fn run_stdin(
    engine: &Orchestrator,
    hint: Option<ActivityCategory>,
    window: usize,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: VecDeque<AnalysisHandle> = VecDeque::new();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        pending.push_back(engine.submit(&line, hint)?);
        if pending.len() >= window.max(1) {
            if let Some(handle) = pending.pop_front() {
                print_result(handle).await?;
            }
        }
    }

    while let Some(handle) = pending.pop_front() {
        print_result(handle).await?;
    }
    Ok(())
}

async fn print_result(handle: AnalysisHandle) -> anyhow::Result<()> {
    let result = handle.wait().await?;
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
