//! # gitcache Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module resolves the settings for one snapshot run. Values come from
//! three layers, highest precedence first:
//!
//! 1. Command-line flags and their environment variables (`BLOB_URL`,
//!    `GITCACHE_SCRATCH_ROOT`), collected by clap into [`Overrides`].
//! 2. A TOML file: the one given with `--config`, or else the per-user
//!    `config.toml` if it exists.
//! 3. Defaults defined in the code.
//!
//! The merged result is validated and turned into [`Settings`], the plain
//! value that is threaded through the pipeline. A missing blob-store location
//! is a `GitCacheError::Config`.
//!
//! ## Examples
//!
//! ```rust
//! let settings = config::resolve(&overrides)?;
//! pipeline::run(&settings, "example.com/acme/widgets").await?;
//! ```
//!
use crate::core::error::{GitCacheError, Result};
use anyhow::Context;
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Represents the configuration file structure.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub blob: BlobConfig,
    #[serde(default)]
    pub scratch: ScratchConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

/// Where snapshot records are published.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct BlobConfig {
    /// Blob store location (`http(s)://...` or `file://...`).
    pub url: Option<String>,
}

/// Scratch directory placement and retention.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScratchConfig {
    /// Parent directory for scratch dirs (can use ~). Defaults to the system temp dir.
    pub root: Option<String>,
    /// Keep scratch dirs after the run instead of deleting them.
    #[serde(default)]
    pub keep: bool,
}

/// Behaviour of the snapshot flow itself.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct SnapshotConfig {
    /// Also write the `lastsync` wall-clock record.
    #[serde(default = "default_record_sync")]
    pub record_sync: bool,
    /// Scheme of the URL handed to `git clone`.
    #[serde(default = "default_clone_scheme")]
    pub clone_scheme: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            record_sync: default_record_sync(),
            clone_scheme: default_clone_scheme(),
        }
    }
}

fn default_record_sync() -> bool {
    true
}
fn default_clone_scheme() -> String {
    "http".to_string()
}

/// Values supplied on the command line (or through clap's env fallbacks).
/// `None` / `false` means "not given, defer to the file or default".
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config_file: Option<PathBuf>,
    pub blob_url: Option<String>,
    pub scratch_root: Option<String>,
    pub keep_scratch: bool,
    pub skip_sync_record: bool,
    pub clone_scheme: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub blob_url: String,
    pub scratch_root: PathBuf,
    pub keep_scratch: bool,
    pub record_sync: bool,
    pub clone_scheme: String,
}

/// Loads the config file (if any), applies overrides, and validates.
pub fn resolve(overrides: &Overrides) -> Result<Settings> {
    let file_config = match &overrides.config_file {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            load_config_from_path(path)?
        }
        None => load_user_config()?.unwrap_or_default(),
    };
    let settings = merge(file_config, overrides)?;
    debug!("Resolved settings: {:?}", settings);
    Ok(settings)
}

fn load_user_config() -> Result<Option<Config>> {
    let Some(proj_dirs) = ProjectDirs::from("", "", "gitcache") else {
        debug!("Could not determine user config directory.");
        return Ok(None);
    };
    let config_path = proj_dirs.config_dir().join("config.toml");
    if config_path.is_file() {
        info!("Loading user configuration from: {}", config_path.display());
        load_config_from_path(&config_path).map(Some)
    } else {
        debug!(
            "User configuration file not found at {}",
            config_path.display()
        );
        Ok(None)
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        GitCacheError::Config(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_config(&content)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content)
        .map_err(|e| GitCacheError::Config(format!("Invalid TOML: {}", e)).into())
}

fn merge(file: Config, overrides: &Overrides) -> Result<Settings> {
    let blob_url = non_blank(overrides.blob_url.as_deref())
        .or_else(|| non_blank(file.blob.url.as_deref()))
        .ok_or_else(|| {
            GitCacheError::Config(
                "BLOB_URL is not set; pass --blob-url or set [blob].url in config.toml".into(),
            )
        })?;

    let scratch_root = match non_blank(overrides.scratch_root.as_deref())
        .or_else(|| non_blank(file.scratch.root.as_deref()))
    {
        Some(raw) => expand_path(&raw)?,
        None => std::env::temp_dir(),
    };

    let clone_scheme = non_blank(overrides.clone_scheme.as_deref())
        .unwrap_or(file.snapshot.clone_scheme)
        .to_ascii_lowercase();
    if !clone_scheme
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        || clone_scheme.is_empty()
    {
        return Err(GitCacheError::Config(format!("Invalid clone scheme '{}'", clone_scheme)).into());
    }

    Ok(Settings {
        blob_url,
        scratch_root,
        keep_scratch: overrides.keep_scratch || file.scratch.keep,
        record_sync: file.snapshot.record_sync && !overrides.skip_sync_record,
        clone_scheme,
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw).map_err(|e| {
        GitCacheError::Config(format!("Failed to expand path '{}': {}", raw, e))
    })?;
    Ok(PathBuf::from(expanded.as_ref()))
}
