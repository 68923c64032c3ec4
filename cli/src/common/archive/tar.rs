//! # gitcache TAR Archive Operations (`common::archive::tar`)
//!
//! File: cli/src/common/archive/tar.rs
//!
//! ## Overview
//!
//! Turns a cloned working tree into the snapshot archive:
//!
//! 1. `strip_vcs_metadata` deletes the tree's `.git` directory. This cannot be undone.
//! 2. `create_tar_gz` walks what remains and writes a gzipped tarball to a file.
//!
//! ## Architecture
//!
//! The `tar` crate builds the container, and `flate2` wraps it in a gzip
//! stream that writes straight to the target file. `walkdir` drives the
//! traversal in file-name order, so identical trees produce identical entry
//! order.
//!
//! - Entry names are paths relative to the tree root (`src/lib.rs`, not
//!   `lib.rs`). The root itself is not an entry.
//! - Directories become header-only entries.
//! - Symbolic links are stored as links and never followed.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::archive::tar;
//!
//! tar::strip_vcs_metadata(tree)?;
//! let summary = tar::create_tar_gz(tree, &archive_dir.join("widgets.tar.gz"))?;
//! println!("{} entries, {} bytes", summary.entries, summary.bytes);
//! ```
//!
use crate::common::fs::io::{ensure_dir_exists, remove_dir_if_exists};
use crate::core::error::{GitCacheError, Result};
use flate2::{write::GzEncoder, Compression};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Name of the version-control metadata directory removed before archiving.
pub const VCS_METADATA_DIR: &str = ".git";

/// What `create_tar_gz` wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Number of tar entries (files, directories, links).
    pub entries: usize,
    /// Size of the compressed archive file.
    pub bytes: u64,
}

/// Removes `<tree>/.git`. A tree without one is left as is.
///
/// # Errors
///
/// `GitCacheError::FileSystem` if the directory exists and cannot be removed.
pub fn strip_vcs_metadata(tree: &Path) -> Result<()> {
    let metadata_dir = tree.join(VCS_METADATA_DIR);
    if remove_dir_if_exists(&metadata_dir)? {
        debug!("Stripped VCS metadata from {:?}", tree);
    } else {
        debug!("No VCS metadata found under {:?}", tree);
    }
    Ok(())
}

/// # Create Gzipped TAR Archive (`create_tar_gz`)
///
/// Writes every file, directory and symlink below `source_dir` into a
/// `.tar.gz` at `target`, overwriting it if present. The parent directory of
/// `target` is created when missing.
///
/// ## Errors
///
/// Returns `GitCacheError::Archive` if:
/// - The tree cannot be walked or a source file cannot be read.
/// - The target file cannot be created or written.
/// - Finishing the tar or gzip stream fails.
pub fn create_tar_gz(source_dir: &Path, target: &Path) -> Result<ArchiveSummary> {
    if let Some(parent) = target.parent() {
        ensure_dir_exists(parent)?;
    }

    let file = File::create(target).map_err(|e| {
        GitCacheError::Archive(format!("Failed to create archive {:?}: {}", target, e))
    })?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    let mut entries = 0usize;
    for entry in WalkDir::new(source_dir)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            GitCacheError::Archive(format!("Failed to walk {:?}: {}", source_dir, e))
        })?;
        let relative = entry.path().strip_prefix(source_dir).map_err(|e| {
            GitCacheError::Archive(format!(
                "Entry {:?} is outside {:?}: {}",
                entry.path(),
                source_dir,
                e
            ))
        })?;
        builder
            .append_path_with_name(entry.path(), relative)
            .map_err(|e| {
                GitCacheError::Archive(format!(
                    "Failed to add {:?} to the archive: {}",
                    entry.path(),
                    e
                ))
            })?;
        entries += 1;
    }

    let encoder = builder.into_inner().map_err(|e| {
        GitCacheError::Archive(format!("Failed to finalize tar archive structure: {}", e))
    })?;
    let mut writer = encoder.finish().map_err(|e| {
        GitCacheError::Archive(format!("Failed to finish gzip compression stream: {}", e))
    })?;
    writer.flush().map_err(|e| {
        GitCacheError::Archive(format!("Failed to flush archive {:?}: {}", target, e))
    })?;
    drop(writer);

    let bytes = fs::metadata(target)
        .map_err(|e| GitCacheError::Archive(format!("Failed to stat archive {:?}: {}", target, e)))?
        .len();
    info!(
        "Archived {:?} into {:?} ({} entries, {} bytes)",
        source_dir, target, entries, bytes
    );
    Ok(ArchiveSummary { entries, bytes })
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::collections::BTreeMap;
    use tar::Archive;
    use tempfile::tempdir;

    /// Relative path -> contents (`None` for directories) of an extracted tree.
    fn snapshot_tree(root: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
        WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .map(|e| e.unwrap())
            .map(|e| {
                let rel = e
                    .path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/");
                let content = e.file_type().is_file().then(|| fs::read(e.path()).unwrap());
                (rel, content)
            })
            .collect()
    }

    fn entry_names(archive_path: &Path) -> Vec<String> {
        let mut archive = Archive::new(GzDecoder::new(File::open(archive_path).unwrap()));
        archive
            .entries()
            .unwrap()
            .map(|e| {
                e.unwrap()
                    .path()
                    .unwrap()
                    .to_string_lossy()
                    .trim_end_matches('/')
                    .to_string()
            })
            .collect()
    }

    fn build_sample_tree(root: &Path) -> Result<()> {
        fs::write(root.join("README.md"), "# widgets\n")?;
        fs::create_dir_all(root.join("src/nested"))?;
        fs::write(root.join("src/lib.rs"), "pub fn hi() {}\n")?;
        fs::write(root.join("src/nested/data.bin"), [0u8, 1, 2, 255])?;
        fs::create_dir(root.join("empty"))?;
        fs::create_dir_all(root.join(".git/refs/heads"))?;
        fs::write(root.join(".git/HEAD"), "ref: refs/heads/main\n")?;
        Ok(())
    }

    #[test]
    fn test_round_trip_without_vcs_metadata() -> Result<()> {
        let tree = tempdir()?;
        build_sample_tree(tree.path())?;
        let out = tempdir()?;
        let target = out.path().join("widgets.tar.gz");

        strip_vcs_metadata(tree.path())?;
        assert!(!tree.path().join(VCS_METADATA_DIR).exists());
        let summary = create_tar_gz(tree.path(), &target)?;
        assert_eq!(summary.bytes, fs::metadata(&target)?.len());
        assert!(summary.bytes > 0);

        let extracted = tempdir()?;
        Archive::new(GzDecoder::new(File::open(&target)?)).unpack(extracted.path())?;

        let original = snapshot_tree(tree.path());
        let restored = snapshot_tree(extracted.path());
        assert_eq!(original, restored);
        assert!(!restored.contains_key(".git"));
        assert_eq!(summary.entries, original.len());
        Ok(())
    }

    #[test]
    fn test_entries_use_relative_paths_in_sorted_order() -> Result<()> {
        let tree = tempdir()?;
        build_sample_tree(tree.path())?;
        strip_vcs_metadata(tree.path())?;
        let out = tempdir()?;
        let target = out.path().join("a.tar.gz");
        create_tar_gz(tree.path(), &target)?;

        assert_eq!(
            entry_names(&target),
            vec![
                "README.md",
                "empty",
                "src",
                "src/lib.rs",
                "src/nested",
                "src/nested/data.bin",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_strip_without_metadata_is_noop() -> Result<()> {
        let tree = tempdir()?;
        fs::write(tree.path().join("file.txt"), "x")?;
        strip_vcs_metadata(tree.path())?;
        assert!(tree.path().join("file.txt").exists());
        Ok(())
    }

    #[test]
    fn test_nested_git_dirs_are_not_stripped() -> Result<()> {
        let tree = tempdir()?;
        fs::create_dir_all(tree.path().join("vendor/dep/.git"))?;
        fs::write(tree.path().join("vendor/dep/.git/HEAD"), "x")?;
        strip_vcs_metadata(tree.path())?;
        assert!(tree.path().join("vendor/dep/.git/HEAD").exists());
        Ok(())
    }

    #[test]
    fn test_creates_missing_target_parent() -> Result<()> {
        let tree = tempdir()?;
        fs::write(tree.path().join("one.txt"), "1")?;
        let out = tempdir()?;
        let target = out.path().join("deep/er/one.tar.gz");
        let summary = create_tar_gz(tree.path(), &target)?;
        assert_eq!(summary.entries, 1);
        assert!(target.is_file());
        Ok(())
    }

    #[test]
    fn test_empty_tree_produces_valid_archive() -> Result<()> {
        let tree = tempdir()?;
        let out = tempdir()?;
        let target = out.path().join("empty.tar.gz");
        let summary = create_tar_gz(tree.path(), &target)?;
        assert_eq!(summary.entries, 0);
        assert!(entry_names(&target).is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_source_is_archive_error() -> Result<()> {
        let out = tempdir()?;
        let err = create_tar_gz(&out.path().join("missing"), &out.path().join("x.tar.gz"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GitCacheError>(),
            Some(GitCacheError::Archive(_))
        ));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_stored_not_followed() -> Result<()> {
        let tree = tempdir()?;
        fs::write(tree.path().join("target.txt"), "real")?;
        std::os::unix::fs::symlink("target.txt", tree.path().join("link.txt"))?;
        let out = tempdir()?;
        let target = out.path().join("links.tar.gz");
        create_tar_gz(tree.path(), &target)?;

        let mut archive = Archive::new(GzDecoder::new(File::open(&target)?));
        let mut saw_link = false;
        for entry in archive.entries()? {
            let entry = entry?;
            if entry.path()?.to_string_lossy() == "link.txt" {
                assert_eq!(entry.header().entry_type(), tar::EntryType::Symlink);
                assert_eq!(
                    entry.link_name()?.unwrap().to_string_lossy(),
                    "target.txt"
                );
                saw_link = true;
            }
        }
        assert!(saw_link);
        Ok(())
    }
}
