//! # gitcache Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared, domain-neutral helpers used by the snapshot command:
//!
//! - **`archive`**: VCS-metadata stripping and `.tar.gz` creation.
//! - **`fs`**: directory helpers and the scratch workspace.
//! - **`process`**: running external programs (git) and capturing output.
//!

/// Utilities for handling archive files (tarballs).
pub mod archive;
/// Utilities for filesystem operations (I/O, scratch directories).
pub mod fs;
/// Utilities for executing external processes.
pub mod process;
