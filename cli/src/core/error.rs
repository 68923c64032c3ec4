//! # gitcache Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error taxonomy used throughout gitcache. Every
//! failure in a snapshot run is terminal: components raise one of the typed
//! variants below, callers add context with `anyhow`, and the single
//! top-level handler in `main.rs` logs the chain and maps it to an exit code.
//!
//! ## Architecture
//!
//! - `GitCacheError`: a `thiserror` enum, one variant per failure domain
//!   (configuration, reference parsing, fetch, filesystem, archive, store).
//! - `Result<T>`: alias for `anyhow::Result<T>`.
//! - `exit_code_for`: finds the typed error anywhere in an `anyhow` chain and
//!   returns its sysexits-style exit code.
//!
//! ## Examples
//!
//! ```rust
//! // Raise a typed error; anyhow carries it to main.
//! if location.is_empty() {
//!     return Err(GitCacheError::Config("BLOB_URL is not set".into()).into());
//! }
//!
//! // Tests inspect the variant through the anyhow wrapper.
//! let err = parse_reference("acme/widgets").unwrap_err();
//! assert!(matches!(
//!     err.downcast_ref::<GitCacheError>(),
//!     Some(GitCacheError::InvalidReference { .. })
//! ));
//! ```
//!
use thiserror::Error;

/// Custom error type for gitcache.
#[derive(Error, Debug)]
pub enum GitCacheError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse repository locator '{input}': {source}")]
    ReferenceParse {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid repository locator '{input}': {reason}, pass the full repository URL")]
    InvalidReference { input: String, reason: String },

    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Failed to write blob store key '{key}': {reason}")]
    StoreWrite { key: String, reason: String },

    #[error("External command failed: {cmd}, Status: {status}, Output:\n{output}")]
    ExternalCommand {
        cmd: String,
        status: String,
        output: String,
    },
}

impl GitCacheError {
    /// Exit status for this error kind (sysexits.h values).
    pub fn exit_code(&self) -> i32 {
        match self {
            GitCacheError::Config(_) => 78,
            GitCacheError::ReferenceParse { .. } | GitCacheError::InvalidReference { .. } => 64,
            GitCacheError::Fetch { .. } | GitCacheError::ExternalCommand { .. } => 69,
            GitCacheError::FileSystem(_) => 73,
            GitCacheError::Archive(_) => 74,
            GitCacheError::StoreWrite { .. } => 75,
        }
    }
}

/// Type alias for Result using anyhow::Error.
pub type Result<T> = anyhow::Result<T>;

/// Walks the error chain and returns the exit code of the first
/// `GitCacheError` found, or `1` for untyped failures.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<GitCacheError>())
        .map_or(1, GitCacheError::exit_code)
}
