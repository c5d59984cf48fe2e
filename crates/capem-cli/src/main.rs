//! # capem CLI entry point
//!
//! Parses flags, sets up tracing, and runs one job.

use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use capem_cli::{run, RunArgs};

/// capem: materialize CA certificates, keys, and CRLs.
///
/// Reads a catalog of named sources (file://, github://, s3://) and a list
/// of orders, then writes each order's sources, concatenated, to a file or
/// to an `export` line in the env output file.
#[derive(Parser, Debug)]
#[command(name = "capem", version, about, long_about = None)]
struct Cli {
    /// Verbosity: -v debug, -vv trace. RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    args: RunArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            interrupt.cancel();
        }
    });

    match run(&cli.args, cancel).await {
        Ok(report) => {
            tracing::debug!(
                completed = report.completed,
                peak_in_flight = report.peak_in_flight,
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
