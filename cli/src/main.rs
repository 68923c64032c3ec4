//! # gitcache Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the gitcache CLI.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Running the snapshot command
//! - Mapping any error to a logged message and a non-zero exit code
//!
//! ## Architecture
//!
//! gitcache is a one-shot tool: one process snapshots one repository. All
//! errors propagate here as `anyhow::Error`. The typed `GitCacheError` inside
//! picks the exit code (see `core::error::exit_code_for`). Nothing below this
//! file calls `process::exit`.
//!
//! ## Examples
//!
//! ```bash
//! # Snapshot into an HTTP blob service
//! BLOB_URL=https://blobs.internal/v1 gitcache example.com/acme/widgets
//!
//! # Local blob directory, debug logging, keep scratch dirs for inspection
//! gitcache -vv --blob-url file:///srv/blobs --keep-scratch example.com/acme/widgets
//! ```
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // The snapshot command and its components
mod common; // Shared utilities (archive, fs, process)
mod core; // Core infrastructure (errors, config)

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "gitcache",
    about = "Snapshot a repository's default branch into a blob store",
    long_about = "Shallow-clones the default branch of a repository, packs the tree \
                  (without .git) into a tar.gz, and writes it plus commit/sync \
                  timestamps to a blob store under gitcache/<owner>/<name>/.",
    version
)]
struct Cli {
    #[command(flatten)]
    snapshot: commands::snapshot::SnapshotArgs,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    if let Err(e) = commands::snapshot::handle_snapshot(cli.snapshot).await {
        tracing::error!("Snapshot failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(core::error::exit_code_for(&e));
    }
}
