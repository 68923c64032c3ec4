//! # gitcache Archive Utilities Module (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//!
//! ## Overview
//!
//! Archive handling for snapshots. The `tar` submodule strips a working
//! tree's VCS metadata and packs the rest into a gzipped tarball on disk.
//!
//! ```rust
//! use crate::common::archive;
//!
//! archive::tar::strip_vcs_metadata(tree)?;
//! let summary = archive::tar::create_tar_gz(tree, &target)?;
//! ```
//!

pub mod tar;
