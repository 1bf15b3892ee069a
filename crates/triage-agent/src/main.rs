//! Surefire failure triage CLI
//!
//! ```bash
//! triage-agent analyze     # write error-summary.json and failure-context.json
//! triage-agent suggest     # ask the model for fixes, write suggested-fixes.json
//! triage-agent             # both
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use triage_agent::{
    recovery_hint, render_fix_summary, ChatCompletionsClient, FixReport, Pipeline, TriageConfig,
};
use triage_core::TracingReporter;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Directory holding TEST-*.xml (overrides TRIAGE_REPORTS_DIR)
    #[arg(long, global = true)]
    reports_dir: Option<PathBuf>,

    /// Directory the JSON documents are written to (overrides TRIAGE_OUTPUT_DIR)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Project root that source roots are resolved against (overrides TRIAGE_BASE_DIR)
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Parse the reports and reconstruct failure context
    Analyze,
    /// Request fix suggestions for a previous analysis
    Suggest,
    /// Analyze, then suggest when anything failed
    Run,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run(Args::parse());
    if let Some(hint) = result.as_ref().err().and_then(recovery_hint) {
        warn!("{hint}");
    }
    result
}

fn run(args: Args) -> Result<()> {
    let config = TriageConfig::load(args.config.as_deref())?.with_overrides(
        args.reports_dir,
        args.output_dir,
        args.base_dir,
    );
    let command = args.command.unwrap_or(Command::Run);
    info!(
        command = ?command,
        reports_dir = %config.reports_dir.display(),
        output_dir = %config.output_dir.display(),
        "Starting test failure triage"
    );

    let pipeline = Pipeline::new(config, Arc::new(TracingReporter));
    match command {
        Command::Analyze => {
            pipeline.analyze()?;
        }
        Command::Suggest => suggest(&pipeline)?,
        Command::Run => {
            let analysis = pipeline.analyze()?;
            if analysis.has_failures() {
                suggest(&pipeline)?;
            } else {
                info!("No failures to suggest fixes for");
            }
        }
    }
    Ok(())
}

fn suggest(pipeline: &Pipeline) -> Result<()> {
    let client = ChatCompletionsClient::from_config(&pipeline.config().endpoint)
        .context("Failed to configure the fix suggestion client")?;
    if let Some(report) = pipeline.suggest(&client)? {
        print_fix_summary(&report);
    }
    Ok(())
}

fn print_fix_summary(report: &FixReport) {
    println!("\nSUGGESTED FIXES:");
    println!("{}", render_fix_summary(report));
}
