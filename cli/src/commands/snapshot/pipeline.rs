//! # Snapshot Pipeline (`commands::snapshot::pipeline`)
//!
//! File: cli/src/commands/snapshot/pipeline.rs
//!
//! ## Overview
//!
//! Runs one snapshot from locator string to published records. The steps are
//! strictly sequential and any error aborts the run:
//!
//! 1. parse the repository reference
//! 2. create the scratch workspace (source dir + archive dir)
//! 3. shallow-clone into the source dir and read the tip commit
//! 4. open the blob store
//! 5. write `lastcommit`
//! 6. strip `.git` from the clone
//! 7. archive the tree to `<archive dir>/<name>.tar.gz`
//! 8. read the archive back into memory
//! 9. write `tar`, then `lastsync` when enabled
//!
//! Settings, the workspace and the store handle are plain values passed down
//! from `handle_snapshot`. Scratch dirs are removed when the workspace drops
//! at the end of `run`, whether or not the run succeeded, unless
//! `keep_scratch` is set.
//!
use super::fetcher::{fetch_source, CommitMetadata};
use super::locator::{parse_reference, RepositoryReference};
use super::publisher::{encode_timestamp, publish, Record, RecordKind};
use super::store::BlobStore;
use crate::common::archive::tar::{create_tar_gz, strip_vcs_metadata};
use crate::common::fs::io::read_file_bytes;
use crate::common::fs::scratch::ScratchWorkspace;
use crate::core::config::Settings;
use crate::core::error::Result;
use anyhow::Context;
use chrono::{DateTime, FixedOffset, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct SnapshotReport {
    pub repository: RepositoryReference,
    pub commit: CommitMetadata,
    pub archive_bytes: usize,
    pub archive_entries: usize,
    pub keys_written: Vec<String>,
    /// Scratch dirs left on disk (only when `keep_scratch` is set).
    pub retained_scratch: Vec<PathBuf>,
}

/// Executes the full snapshot for `locator`.
#[instrument(skip(settings))]
pub async fn run(settings: &Settings, locator: &str) -> Result<SnapshotReport> {
    let repository = parse_reference(locator)?;
    info!("Snapshotting {}", repository);

    let workspace = ScratchWorkspace::create(
        &settings.scratch_root,
        &repository.label(),
        settings.keep_scratch,
    )?;

    let clone_url = repository.clone_url(&settings.clone_scheme);
    let commit = fetch_source(&clone_url, workspace.source.path()).await?;

    let store = BlobStore::open(&settings.blob_url)?;

    let published = publish_snapshot(
        &store,
        &repository,
        &commit,
        workspace.source.path(),
        workspace.archive.path(),
        settings.record_sync.then(Utc::now),
    )
    .await
    .with_context(|| format!("Snapshot of {} failed", repository))?;

    let retained_scratch = [&workspace.source, &workspace.archive]
        .into_iter()
        .filter(|dir| !dir.is_ephemeral())
        .map(|dir| dir.path().to_path_buf())
        .collect();

    Ok(SnapshotReport {
        repository,
        commit,
        archive_bytes: published.archive_bytes,
        archive_entries: published.archive_entries,
        keys_written: published.keys_written,
        retained_scratch,
    })
}

#[derive(Debug)]
struct Published {
    archive_bytes: usize,
    archive_entries: usize,
    keys_written: Vec<String>,
}

/// Steps 5 to 9: everything after the clone. `synced_at` is the `lastsync`
/// value, or `None` to skip that record.
async fn publish_snapshot(
    store: &BlobStore,
    repository: &RepositoryReference,
    commit: &CommitMetadata,
    tree: &Path,
    archive_dir: &Path,
    synced_at: Option<DateTime<Utc>>,
) -> Result<Published> {
    let mut keys_written =
        publish(store, vec![commit_record(repository, &commit.authored_at)]).await?;

    strip_vcs_metadata(tree)?;
    let archive_path = archive_dir.join(format!("{}.tar.gz", repository.name));
    let summary = create_tar_gz(tree, &archive_path)?;
    let archive = read_file_bytes(&archive_path)?;
    let archive_bytes = archive.len();
    debug!(
        "Loaded {} ({} of {} bytes)",
        archive_path.display(),
        archive_bytes,
        summary.bytes
    );

    let mut records = vec![Record::new(repository, RecordKind::Tar, archive)];
    if let Some(at) = synced_at {
        records.push(Record::new(
            repository,
            RecordKind::LastSync,
            encode_timestamp(&at),
        ));
    }
    keys_written.extend(publish(store, records).await?);

    Ok(Published {
        archive_bytes,
        archive_entries: summary.entries,
        keys_written,
    })
}

fn commit_record(repository: &RepositoryReference, authored_at: &DateTime<FixedOffset>) -> Record {
    Record::new(
        repository,
        RecordKind::LastCommit,
        encode_timestamp(authored_at),
    )
}
