//! # gitcache Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! Thin wrappers around `std::fs` that attach context and raise
//! `GitCacheError::FileSystem` for the failures a snapshot run cares about:
//!
//! - **`ensure_dir_exists`**: `mkdir -p`, but refuses a path that exists as a non-directory.
//! - **`remove_dir_if_exists`**: recursive removal that treats "already gone" as success.
//! - **`read_file_bytes`**: reads a whole file into memory.
//!
use crate::core::error::{GitCacheError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Ensures that a directory exists at the specified path, creating parents
/// as needed.
///
/// # Errors
///
/// Returns `GitCacheError::FileSystem` if the path exists but is not a
/// directory, or if creating it fails.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            GitCacheError::FileSystem(format!("Failed to create directory {:?}: {}", path, e))
        })?;
        debug!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        anyhow::bail!(GitCacheError::FileSystem(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Recursively removes the directory at `path`.
///
/// Returns `Ok(false)` if there was nothing to remove and `Ok(true)` if the
/// directory was deleted.
pub fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            debug!("Removed directory: {:?}", path);
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(GitCacheError::FileSystem(format!(
            "Failed to remove directory {:?}: {}",
            path, e
        ))
        .into()),
    }
}

/// Reads the entire file into a byte vector.
pub fn read_file_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| {
        GitCacheError::FileSystem(format!("Failed to read file {:?}: {}", path, e)).into()
    })
}
