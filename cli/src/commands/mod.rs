//! # gitcache Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! Command implementations. gitcache has a single command, `snapshot`, whose
//! arguments are flattened into the top-level CLI.
//!

/// Snapshot a repository into the blob store.
pub mod snapshot;
