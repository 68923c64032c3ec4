//! # gitcache Scratch Workspace (`common::fs::scratch`)
//!
//! File: cli/src/common/fs/scratch.rs
//!
//! ## Overview
//!
//! A snapshot run needs two short-lived directories under the configured
//! scratch root: one for the cloned tree and one for the produced archive.
//! [`ScratchWorkspace`] owns both. Dropping it removes them (best-effort,
//! via `tempfile::TempDir`), which also covers runs that abort part-way.
//! With `keep` set the directories are detached from cleanup and survive
//! the process so they can be inspected.
//!
use crate::common::fs::io::ensure_dir_exists;
use crate::core::error::{GitCacheError, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// A single scratch directory, removed on drop unless retained.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    guard: Option<TempDir>,
}

impl ScratchDir {
    fn create(root: &Path, prefix: &str, keep: bool) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(root)
            .map_err(|e| {
                GitCacheError::FileSystem(format!(
                    "Failed to create scratch directory in {:?}: {}",
                    root, e
                ))
            })?;
        if keep {
            let path = dir.keep();
            warn!("Retaining scratch directory {}", path.display());
            Ok(Self { path, guard: None })
        } else {
            Ok(Self {
                path: dir.path().to_path_buf(),
                guard: Some(dir),
            })
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this directory will be deleted when dropped.
    pub fn is_ephemeral(&self) -> bool {
        self.guard.is_some()
    }
}

/// The pair of scratch directories used by one run.
#[derive(Debug)]
pub struct ScratchWorkspace {
    pub source: ScratchDir,
    pub archive: ScratchDir,
}

impl ScratchWorkspace {
    /// Creates both directories under `root` (created if missing).
    /// `label` becomes part of the directory names, e.g. `acme-widgets`.
    pub fn create(root: &Path, label: &str, keep: bool) -> Result<Self> {
        ensure_dir_exists(root)?;
        let source = ScratchDir::create(root, &format!("gitcache-{}-src-", label), keep)?;
        let archive = ScratchDir::create(root, &format!("gitcache-{}-tar-", label), keep)?;
        debug!(
            "Scratch workspace: source={:?} archive={:?}",
            source.path(),
            archive.path()
        );
        Ok(Self { source, archive })
    }
}
