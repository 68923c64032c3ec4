//! # gitcache Snapshot Command (`commands::snapshot`)
//!
//! File: cli/src/commands/snapshot/mod.rs
//!
//! ## Overview
//!
//! The snapshot command is the whole tool: take one repository locator,
//! shallow-clone its default branch, and publish a tarball plus timestamps to
//! the blob store under `gitcache/<owner>/<name>/`.
//!
//! ## Architecture
//!
//! Leaves first:
//! - **`locator`**: `host/owner/name` parsing (`RepositoryReference`).
//! - **`fetcher`**: depth-1 `git clone` and tip-commit metadata.
//! - **`store`**: blob store backends (HTTP `PUT`, local directory).
//! - **`publisher`**: record keys, timestamp encoding, ordered writes.
//! - **`pipeline`**: the sequential run that ties them together.
//!
//! `handle_snapshot` resolves configuration, runs the pipeline and reports
//! the result. Errors propagate to `main`, which maps them to an exit code.
//!
//! ## Usage
//!
//! ```bash
//! BLOB_URL=https://blobs.internal/v1 gitcache example.com/acme/widgets
//! gitcache --blob-url file:///srv/blobs --skip-sync-record https://example.com/acme/widgets
//! ```
//!
use crate::core::config::{self, Overrides};
use crate::core::error::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

/// Fetches a shallow clone and reads the tip commit.
mod fetcher;
/// Parses repository locators.
mod locator;
/// Sequences one snapshot run.
mod pipeline;
/// Record keys, encoding and ordered writes.
mod publisher;
/// Blob store backends.
mod store;

/// # Snapshot Arguments (`SnapshotArgs`)
///
/// Flattened into the top-level CLI: the tool has no subcommands.
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Repository to snapshot, with or without scheme
    /// (e.g. `host.example.com/owner/name`).
    #[arg(value_name = "REPOSITORY")]
    pub repository: String,

    /// Blob store location (`http(s)://...` or `file:///dir`).
    #[arg(long, env = "BLOB_URL", value_name = "URL", hide_env_values = true)]
    pub blob_url: Option<String>,

    /// Read settings from this TOML file instead of the per-user config.toml.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Parent directory for the scratch directories.
    #[arg(long, env = "GITCACHE_SCRATCH_ROOT", value_name = "DIR")]
    pub scratch_root: Option<String>,

    /// Keep the scratch directories after the run.
    #[arg(long)]
    pub keep_scratch: bool,

    /// Do not write the `lastsync` record.
    #[arg(long)]
    pub skip_sync_record: bool,

    /// Scheme used to build the clone URL (default: http).
    #[arg(long, value_name = "SCHEME")]
    pub clone_scheme: Option<String>,
}

impl SnapshotArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            config_file: self.config.clone(),
            blob_url: self.blob_url.clone(),
            scratch_root: self.scratch_root.clone(),
            keep_scratch: self.keep_scratch,
            skip_sync_record: self.skip_sync_record,
            clone_scheme: self.clone_scheme.clone(),
        }
    }
}

/// # Handle Snapshot (`handle_snapshot`)
///
/// Resolves settings (failing fast on a missing blob store location), runs
/// the pipeline, and prints a one-line summary on success.
pub async fn handle_snapshot(args: SnapshotArgs) -> Result<()> {
    let settings = config::resolve(&args.overrides())?;
    let report = pipeline::run(&settings, &args.repository).await?;

    info!(
        "Snapshot of {} complete: commit {}, {} entries, {} bytes, keys {:?}",
        report.repository,
        report.commit.id,
        report.archive_entries,
        report.archive_bytes,
        report.keys_written
    );
    if !report.retained_scratch.is_empty() {
        info!("Scratch directories left on disk: {:?}", report.retained_scratch);
    }
    println!(
        "{} @ {} ({}): {} bytes -> {}",
        report.repository,
        &report.commit.id[..report.commit.id.len().min(12)],
        report.commit.authored_at.to_rfc3339(),
        report.archive_bytes,
        report.repository.key_prefix()
    );
    Ok(())
}
