//! # Source Fetcher (`commands::snapshot::fetcher`)
//!
//! File: cli/src/commands/snapshot/fetcher.rs
//!
//! ## Overview
//!
//! Shallow-clones a repository's default branch and reads the tip commit.
//! Both steps run the system `git` binary through `common::process`:
//!
//! - `git clone --depth 1 --no-tags <url> <dest>`
//! - `git show -s --format=%H%n%aI HEAD` inside the clone
//!
//! `GIT_TERMINAL_PROMPT=0` is set for every invocation, so a private
//! repository fails instead of waiting on a credential prompt. Every failure
//! (spawn, transport, auth, empty repository, unparsable output) is reported
//! as `GitCacheError::Fetch`.
//!
use crate::common::process::run_command_capture;
use crate::core::error::{GitCacheError, Result};
use chrono::{DateTime, FixedOffset};
use std::path::Path;
use tracing::{debug, info, instrument};

const GIT: &str = "git";
const GIT_ENV: &[(&str, &str)] = &[("GIT_TERMINAL_PROMPT", "0")];

/// Tip commit of the cloned default branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMetadata {
    /// Full hex object id.
    pub id: String,
    /// Author timestamp, in the author's own UTC offset.
    pub authored_at: DateTime<FixedOffset>,
}

/// Clones `url` into `dest` with depth 1 and returns the tip commit.
///
/// `dest` may exist if it is empty (a fresh scratch directory).
#[instrument(skip_all, fields(%url, dest = %dest.display()))]
pub async fn fetch_source(url: &str, dest: &Path) -> Result<CommitMetadata> {
    let dest_arg = dest.to_string_lossy();
    let output = run_command_capture(
        GIT,
        &["clone", "--depth", "1", "--no-tags", url, dest_arg.as_ref()],
        None,
        GIT_ENV,
    )
    .await
    .map_err(|e| fetch_error(url, "clone failed", &e))?;
    debug!("Shallow clone finished: {}", output.stderr.trim());

    let commit = read_head_commit(dest)
        .await
        .map_err(|e| fetch_error(url, "could not resolve the default branch tip", &e))?;
    info!(
        "Fetched {} at commit {} (authored {})",
        url,
        commit.id,
        commit.authored_at.to_rfc3339()
    );
    Ok(commit)
}

/// Reads id and author time of `HEAD` in the repository at `repo`.
pub async fn read_head_commit(repo: &Path) -> Result<CommitMetadata> {
    let output = run_command_capture(
        GIT,
        &["show", "-s", "--format=%H%n%aI", "HEAD"],
        Some(repo),
        GIT_ENV,
    )
    .await?;
    parse_show_output(&output.stdout)
}

fn parse_show_output(stdout: &str) -> Result<CommitMetadata> {
    let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());
    let (Some(id), Some(when)) = (lines.next(), lines.next()) else {
        anyhow::bail!("unexpected `git show` output: {:?}", stdout);
    };
    if id.len() < 40 || !id.chars().all(|c| c.is_ascii_hexdigit()) {
        anyhow::bail!("unexpected commit id {:?}", id);
    }
    let authored_at = DateTime::parse_from_rfc3339(when)
        .map_err(|e| anyhow::anyhow!("unparsable author date {:?}: {}", when, e))?;
    Ok(CommitMetadata {
        id: id.to_string(),
        authored_at,
    })
}

fn fetch_error(url: &str, what: &str, cause: &anyhow::Error) -> GitCacheError {
    GitCacheError::Fetch {
        url: url.to_string(),
        reason: format!("{}: {:#}", what, cause),
    }
}
