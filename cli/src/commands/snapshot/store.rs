//! # Blob Store Backends (`commands::snapshot::store`)
//!
//! File: cli/src/commands/snapshot/store.rs
//!
//! ## Overview
//!
//! The blob store is an external key-value service with a single operation,
//! `set(key, bytes)`, that overwrites any previous value. The backend is
//! chosen by the scheme of the configured location:
//!
//! | Location | Backend | `set` |
//! |---|---|---|
//! | `http://`, `https://` | [`HttpBlobStore`] | `PUT <base>/<key>` with the bytes as body |
//! | `file://<dir>` | [`DirectoryBlobStore`] | write `<dir>/<key>` via temp file + rename |
//!
//! Opening validates the location and raises `GitCacheError::Config`. Every
//! failed write raises `GitCacheError::StoreWrite` naming the key. Nothing is
//! retried.
//!
use crate::common::fs::io::ensure_dir_exists;
use crate::core::error::{GitCacheError, Result};
use reqwest::header::CONTENT_TYPE;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};
use url::Url;

/// Handle to an opened blob store.
#[derive(Debug)]
pub enum BlobStore {
    Http(HttpBlobStore),
    Directory(DirectoryBlobStore),
}

impl BlobStore {
    /// Parses `location` and builds the matching backend. Does not touch
    /// the network.
    pub fn open(location: &str) -> Result<Self> {
        let url = Url::parse(location.trim()).map_err(|e| {
            GitCacheError::Config(format!("Invalid blob store location '{}': {}", location, e))
        })?;
        let store = match url.scheme() {
            "http" | "https" => BlobStore::Http(HttpBlobStore::new(url)?),
            "file" => {
                let root = url.to_file_path().map_err(|_| {
                    GitCacheError::Config(format!(
                        "Blob store location '{}' is not a local path",
                        location
                    ))
                })?;
                BlobStore::Directory(DirectoryBlobStore::new(root))
            }
            other => {
                return Err(GitCacheError::Config(format!(
                    "Unsupported blob store scheme '{}' in '{}'",
                    other, location
                ))
                .into())
            }
        };
        info!("Opened blob store: {}", store.describe());
        Ok(store)
    }

    /// Stores `value` under `key`, replacing what was there. The buffer is
    /// moved into the backend, so large archives are not held twice.
    pub async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        validate_key(key)?;
        match self {
            BlobStore::Http(store) => store.set(key, value).await,
            BlobStore::Directory(store) => store.set(key, &value),
        }
    }

    fn describe(&self) -> String {
        match self {
            BlobStore::Http(store) => store.base.to_string(),
            BlobStore::Directory(store) => format!("file://{}", store.root.display()),
        }
    }
}

/// Keys are `/`-separated relative names; no empty, `.` or `..` segments.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty()
        || key.starts_with('/')
        || key.split('/').any(|s| s.is_empty() || s == "." || s == "..")
    {
        anyhow::bail!(GitCacheError::StoreWrite {
            key: key.to_string(),
            reason: "invalid key".to_string(),
        });
    }
    Ok(())
}

fn store_error(key: &str, reason: impl std::fmt::Display) -> GitCacheError {
    GitCacheError::StoreWrite {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// HTTP blob service client.
#[derive(Debug)]
pub struct HttpBlobStore {
    client: reqwest::Client,
    base: Url,
}

impl HttpBlobStore {
    pub fn new(mut base: Url) -> Result<Self> {
        if base.cannot_be_a_base() {
            anyhow::bail!(GitCacheError::Config(format!(
                "Blob store URL '{}' cannot be used as a base",
                base
            )));
        }
        // Url::join replaces the last segment unless the base ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("gitcache/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GitCacheError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, base })
    }

    /// Full URL for `key`.
    pub fn key_url(&self, key: &str) -> Result<Url> {
        self.base
            .join(key)
            .map_err(|e| store_error(key, format!("cannot build URL: {}", e)).into())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let url = self.key_url(key)?;
        let len = value.len();
        debug!("PUT {} ({} bytes)", url, len);
        let response = self
            .client
            .put(url.clone())
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(value)
            .send()
            .await
            .map_err(|e| store_error(key, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(store_error(
                key,
                format!("{} returned {}: {}", url, status, body.trim())
            ));
        }
        info!("Stored {} ({} bytes)", key, len);
        Ok(())
    }
}

/// Store rooted at a local directory, one file per key.
#[derive(Debug)]
pub struct DirectoryBlobStore {
    root: PathBuf,
}

impl DirectoryBlobStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// File backing `key`.
    pub fn key_path(&self, key: &str) -> PathBuf {
        key.split('/').fold(self.root.clone(), |path, segment| path.join(segment))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let target = self.key_path(key);
        let parent = target.parent().unwrap_or(self.root.as_path());
        ensure_dir_exists(parent).map_err(|e| store_error(key, format!("{:#}", e)))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| store_error(key, e))?;
        tmp.write_all(value).map_err(|e| store_error(key, e))?;
        tmp.as_file().sync_all().map_err(|e| store_error(key, e))?;
        tmp.persist(&target).map_err(|e| store_error(key, e.error))?;
        info!("Stored {} ({} bytes) at {:?}", key, value.len(), target);
        Ok(())
    }
}
