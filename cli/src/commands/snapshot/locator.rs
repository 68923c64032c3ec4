//! # Repository Locator (`commands::snapshot::locator`)
//!
//! File: cli/src/commands/snapshot/locator.rs
//!
//! Parses the user-supplied repository string into a [`RepositoryReference`].
//!
//! Accepted shape: `[scheme://]host[:port]/owner/name[/extra...]`. A missing
//! scheme means `https://`. Segments after `name` are ignored.
//!
//! There is no "path only" form. `acme/widgets` parses as host `acme` with a
//! single path segment and is rejected.
//!
use crate::core::error::{GitCacheError, Result};
use percent_encoding::percent_decode_str;
use std::fmt;
use url::Url;

const DEFAULT_SCHEME: &str = "https://";

/// Where a repository lives: `host/owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReference {
    pub host: String,
    pub owner: String,
    pub name: String,
}

impl RepositoryReference {
    /// URL handed to `git clone`, e.g. `http://example.com/acme/widgets`.
    pub fn clone_url(&self, scheme: &str) -> String {
        format!("{}://{}/{}/{}", scheme, self.host, self.owner, self.name)
    }

    /// Blob store key prefix shared by all records of this repository.
    pub fn key_prefix(&self) -> String {
        format!("gitcache/{}/{}", self.owner, self.name)
    }

    /// Filesystem-friendly label used for scratch directory names.
    pub fn label(&self) -> String {
        format!("{}-{}", self.owner, self.name)
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect()
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.host, self.owner, self.name)
    }
}

/// Parses `input` into a [`RepositoryReference`].
///
/// # Errors
///
/// - `GitCacheError::ReferenceParse` if the string is not a URL (after the
///   default scheme is applied).
/// - `GitCacheError::InvalidReference` if it has no host, or if the path does
///   not start with two non-blank segments.
pub fn parse_reference(input: &str) -> Result<RepositoryReference> {
    let trimmed = input.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME, trimmed)
    };

    let url = Url::parse(&candidate).map_err(|source| GitCacheError::ReferenceParse {
        input: candidate.clone(),
        source,
    })?;

    let invalid = |reason: &str| GitCacheError::InvalidReference {
        input: candidate.clone(),
        reason: reason.to_string(),
    };

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        },
        _ => return Err(invalid("missing host").into()),
    };

    let mut segments = url.path().trim_matches('/').split('/');
    let owner = segments.next().unwrap_or_default();
    let Some(name) = segments.next() else {
        return Err(invalid("expected <owner>/<name> in the path").into());
    };
    let (Some(owner), Some(name)) = (decode_segment(owner), decode_segment(name)) else {
        return Err(invalid("owner and name must be valid UTF-8").into());
    };
    if owner.trim().is_empty() || name.trim().is_empty() {
        return Err(invalid("owner and name must not be empty").into());
    }
    if owner.contains('/') || name.contains('/') {
        return Err(invalid("owner and name must not contain an encoded '/'").into());
    }

    Ok(RepositoryReference { host, owner, name })
}

/// `Url::path` is percent-encoded; owner and name are stored decoded.
fn decode_segment(segment: &str) -> Option<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}
