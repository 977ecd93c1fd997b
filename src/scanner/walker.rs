//! Physical traversal of scan roots.
//!
//! Symlinks are never followed, root symlinks included. Only regular files
//! are yielded; directories, symlinks and special files are skipped silently.

use super::filter::ExclusionSet;
use crate::errors::RootFailure;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A regular file discovered under a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Full path as reached from the root
    pub path: PathBuf,
    /// Modification time in whole seconds since the epoch
    pub modified_at: i64,
    /// Size in bytes
    pub size_bytes: u64,
}

/// Item produced by [`TreeWalker::walk`].
#[derive(Debug)]
pub enum WalkItem {
    /// An eligible regular file
    File(Candidate),
    /// A root could not be opened; traversal moves on to the next root
    RootFailed(RootFailure),
}

/// Walks one or more roots, applying the exclusion set as it goes.
#[derive(Debug, Clone)]
pub struct TreeWalker<'a> {
    roots: &'a [PathBuf],
    exclusions: &'a ExclusionSet,
}

impl<'a> TreeWalker<'a> {
    /// Creates a walker over `roots`.
    #[must_use]
    pub const fn new(roots: &'a [PathBuf], exclusions: &'a ExclusionSet) -> Self {
        Self { roots, exclusions }
    }

    /// Lazily yields every eligible file under every root, in filesystem order.
    pub fn walk(&self) -> impl Iterator<Item = WalkItem> + use<'a> {
        let exclusions = self.exclusions;
        self.roots
            .iter()
            .flat_map(move |root| walk_root(root, exclusions))
    }
}

fn walk_root<'a>(
    root: &'a Path,
    exclusions: &'a ExclusionSet,
) -> impl Iterator<Item = WalkItem> + 'a {
    debug!(root = %root.display(), "walking root");

    WalkDir::new(root)
        .follow_links(false)
        .follow_root_links(false)
        .into_iter()
        // Excluded directories are pruned: every descendant path contains
        // the directory path and would match the same pattern.
        .filter_entry(move |entry| !exclusions.is_excluded(entry.path()))
        .filter_map(move |entry| match entry {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    return None;
                }
                match entry.metadata() {
                    Ok(metadata) => Some(WalkItem::File(Candidate {
                        path: entry.into_path(),
                        modified_at: mtime_secs(&metadata),
                        size_bytes: metadata.len(),
                    })),
                    Err(e) => {
                        debug!(
                            path = %entry.path().display(),
                            error = %e,
                            "skipping entry without metadata"
                        );
                        None
                    }
                }
            }
            Err(e) if e.depth() == 0 => {
                warn!(root = %root.display(), error = %e, "cannot traverse root");
                Some(WalkItem::RootFailed(RootFailure {
                    root: root.to_path_buf(),
                    message: root_error_message(&e),
                }))
            }
            Err(e) => {
                warn!(
                    root = %root.display(),
                    path = ?e.path(),
                    error = %e,
                    "skipping unreadable directory"
                );
                None
            }
        })
}

fn root_error_message(e: &walkdir::Error) -> String {
    e.io_error()
        .map_or_else(|| e.to_string(), ToString::to_string)
}

#[cfg(unix)]
fn mtime_secs(metadata: &std::fs::Metadata) -> i64 {
    use std::os::unix::fs::MetadataExt;
    metadata.mtime()
}

#[cfg(not(unix))]
fn mtime_secs(metadata: &std::fs::Metadata) -> i64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .and_then(|d| i64::try_from(d.as_secs()).ok())
        .unwrap_or(0)
}
