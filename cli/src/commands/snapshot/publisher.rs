//! # Blob Publisher (`commands::snapshot::publisher`)
//!
//! File: cli/src/commands/snapshot/publisher.rs
//!
//! ## Overview
//!
//! Names and encodes the records a snapshot writes, and writes them in order.
//!
//! Each repository owns three keys under `gitcache/<owner>/<name>/`:
//!
//! | Record | Value |
//! |---|---|
//! | `lastcommit` | author time of the tip commit, RFC 3339 with the author's offset |
//! | `tar` | the gzipped tarball bytes |
//! | `lastsync` | wall-clock time of the upload, RFC 3339 in UTC (`Z`) |
//!
//! Timestamps have whole-second precision and are stored as UTF-8 text.
//!
//! Records are independent: there is no transaction across keys. `publish`
//! stops at the first failed write, so later records are never attempted.
//!
use super::locator::RepositoryReference;
use super::store::BlobStore;
use crate::core::error::Result;
use chrono::{DateTime, SecondsFormat, TimeZone};
use tracing::debug;

/// One of the per-repository records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    LastCommit,
    LastSync,
    Tar,
}

impl RecordKind {
    pub fn suffix(self) -> &'static str {
        match self {
            RecordKind::LastCommit => "lastcommit",
            RecordKind::LastSync => "lastsync",
            RecordKind::Tar => "tar",
        }
    }

    /// Full key, e.g. `gitcache/acme/widgets/tar`.
    pub fn key_for(self, repo: &RepositoryReference) -> String {
        format!("{}/{}", repo.key_prefix(), self.suffix())
    }
}

/// A value ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: String,
    pub value: Vec<u8>,
}

impl Record {
    pub fn new(repo: &RepositoryReference, kind: RecordKind, value: Vec<u8>) -> Self {
        Self {
            key: kind.key_for(repo),
            value,
        }
    }
}

/// Canonical timestamp encoding for `lastcommit` and `lastsync`.
pub fn encode_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> Vec<u8>
where
    Tz::Offset: std::fmt::Display,
{
    at.to_rfc3339_opts(SecondsFormat::Secs, true).into_bytes()
}

/// Writes `records` in order, aborting on the first failure.
/// Returns the keys written. Each value is handed to the store by move.
pub async fn publish(store: &BlobStore, records: Vec<Record>) -> Result<Vec<String>> {
    let mut written = Vec::with_capacity(records.len());
    for Record { key, value } in records {
        debug!("Writing {} ({} bytes)", key, value.len());
        store.set(&key, value).await?;
        written.push(key);
    }
    Ok(written)
}
