//! # gitcache Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! Filesystem helpers shared by the snapshot pipeline:
//!
//! - **`io`**: directory creation and removal, whole-file reads, all raising
//!   `GitCacheError::FileSystem` with the offending path.
//! - **`scratch`**: the pair of ephemeral directories a run works in.
//!
//! Callers import the submodule they need, e.g. `crate::common::fs::io::ensure_dir_exists`.
//!

/// Basic file I/O operations (`ensure_dir_exists`, `remove_dir_if_exists`, `read_file_bytes`).
pub mod io;
/// Scratch directories owned by a single run.
pub mod scratch;
