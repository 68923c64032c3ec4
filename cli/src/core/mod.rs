//! # gitcache Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational pieces used by every other module:
//! - `config`: resolving flags, env vars and the optional TOML file into `Settings`
//! - `error`: the `GitCacheError` taxonomy and exit-code mapping
//!
pub mod config;
pub mod error;
