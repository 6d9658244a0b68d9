use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use driver_api::Driver;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use formpilot_cli::bootstrap::SimulatedBootstrap;
use formpilot_cli::config;
use formpilot_cli::records::CsvRecordProvider;
use formpilot_cli::{BatchRunner, RecordProvider, SessionBootstrap, UnitCatalog};

#[derive(Parser)]
#[command(name = "formpilot", version, about = "Drive record batches through a dynamic entry form")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a batch of records through the entry form
    Run {
        /// CSV file with the records to submit
        #[arg(long)]
        records: PathBuf,
        /// YAML site profile with the form's selectors
        #[arg(long)]
        profile: PathBuf,
        /// Run against the built-in simulated entry site
        #[arg(long)]
        simulate: bool,
        /// Write the full batch report as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
        /// Base wait timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Poll interval in milliseconds
        #[arg(long)]
        poll_ms: Option<u64>,
    },
    /// Validate a record file without touching any interface
    Check {
        /// CSV file with the records to validate
        #[arg(long)]
        records: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Run {
            records,
            profile,
            simulate,
            report,
            timeout_ms,
            poll_ms,
        } => run(records, profile, simulate, report, timeout_ms, poll_ms).await,
        Command::Check { records } => check(records).await,
    }
}

async fn run(
    records: PathBuf,
    profile: PathBuf,
    simulate: bool,
    report_path: Option<PathBuf>,
    timeout_ms: Option<u64>,
    poll_ms: Option<u64>,
) -> Result<()> {
    let profile = config::load_profile(&profile)?;
    let timeouts = config::timeouts_from_flags(timeout_ms, poll_ms);
    let catalog = Arc::new(UnitCatalog::default());

    let batch = CsvRecordProvider::new(&records)
        .fetch()
        .await
        .with_context(|| format!("loading records from {}", records.display()))?;

    if !simulate {
        bail!("no interface driver configured; pass --simulate to rehearse against the built-in site");
    }
    let bootstrap = SimulatedBootstrap::new(profile.clone(), catalog.clone());
    let driver = bootstrap
        .establish()
        .await
        .context("establishing the interface session")?;

    let runner = BatchRunner::new(driver.clone(), catalog, profile, timeouts);
    let report = runner.run(batch).await;

    // the session is released whether or not the batch went well
    if let Err(err) = driver.close().await {
        warn!(%err, "session close failed");
    }

    println!("{}", report.summary());
    for record in &report.records {
        if let Some(err) = &record.error {
            println!("  record {} ({}): {err}", record.index, record.name);
        }
        for warning in &record.field_warnings {
            println!("  record {} ({}): warning: {warning}", record.index, record.name);
        }
    }
    if let Some(path) = report_path {
        let doc = serde_json::to_string_pretty(&report).context("serializing the batch report")?;
        std::fs::write(&path, doc).with_context(|| format!("writing {}", path.display()))?;
        println!("report written to {}", path.display());
    }
    Ok(())
}

async fn check(records: PathBuf) -> Result<()> {
    let summary = formpilot_cli::check::check_records(&records).await?;
    for index in &summary.skipped {
        println!("record {index}: no identifying field; would be skipped");
    }
    for (index, violation) in &summary.findings {
        println!("record {index}: {violation}");
    }
    println!(
        "checked {} records: {} clean, {} flagged, {} would be skipped",
        summary.total,
        summary.clean,
        summary.flagged,
        summary.skipped.len()
    );
    Ok(())
}
