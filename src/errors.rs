//! Error types surfaced by the baseline engine.
//!
//! Per-file read failures never show up here: the coordinator skips those
//! files silently. What remains are failures that belong to a whole operation
//! (a root that could not be walked, a snapshot that could not be loaded) or
//! to a single storage location.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures reading, writing or removing baseline snapshot files.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O failure on a specific snapshot location
    #[error("{action} {}: {source}", .path.display())]
    Io {
        /// What was being attempted ("read", "write", "remove")
        action: &'static str,
        /// Snapshot location
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Snapshot ended before all declared records were read
    #[error("snapshot is truncated")]
    Truncated,

    /// Snapshot is structurally inconsistent
    #[error("snapshot is corrupt: {0}")]
    Corrupt(String),

    /// A record cannot be represented in the snapshot layout
    #[error("cannot encode record {}: {reason}", .path.display())]
    Unencodable {
        /// Offending record path
        path: PathBuf,
        /// Why it does not fit
        reason: String,
    },

    /// More records than the snapshot's 32-bit count field can hold
    #[error("cannot encode {count} records: exceeds the snapshot record count field")]
    TooManyRecords {
        /// Number of records in the baseline
        count: usize,
    },

    /// None of the candidate locations held a loadable snapshot
    #[error("no baseline available (tried {})", format_attempts(.0))]
    NoBaseline(Vec<LoadAttempt>),
}

impl StoreError {
    /// Copies an encoding failure so it can be reported for each location.
    ///
    /// Only encoding variants carry owned data that can be duplicated; any
    /// other variant is described as [`StoreError::Corrupt`].
    pub(crate) fn replicate(&self) -> Self {
        match self {
            Self::Unencodable { path, reason } => Self::Unencodable {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::TooManyRecords { count } => Self::TooManyRecords { count: *count },
            Self::Truncated => Self::Truncated,
            Self::Corrupt(reason) => Self::Corrupt(reason.clone()),
            other => Self::Corrupt(other.to_string()),
        }
    }

    /// Builds an [`StoreError::Io`] for `path`.
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// One failed attempt to load a snapshot from a candidate location.
#[derive(Debug)]
pub struct LoadAttempt {
    /// Location that was tried
    pub path: PathBuf,
    /// Why it did not load
    pub reason: String,
}

fn format_attempts(attempts: &[LoadAttempt]) -> String {
    if attempts.is_empty() {
        return "no locations configured".to_string();
    }
    attempts
        .iter()
        .map(|a| format!("{}: {}", a.path.display(), a.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A scan root that could not be opened or traversed.
#[derive(Debug, Clone)]
pub struct RootFailure {
    /// Root as given to the scan
    pub root: PathBuf,
    /// Description of the failure
    pub message: String,
}

impl fmt::Display for RootFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.root.display(), self.message)
    }
}

/// Failures that abort a build or check pass.
#[derive(Debug, Error)]
pub enum ScanError {
    /// One or more roots failed; the remaining roots were still walked
    #[error("directory scan error: {}", format_failures(.0))]
    Traversal(Vec<RootFailure>),
}

impl ScanError {
    /// Roots that failed during the pass.
    #[must_use]
    pub fn failures(&self) -> &[RootFailure] {
        match self {
            Self::Traversal(failures) => failures,
        }
    }
}

fn format_failures(failures: &[RootFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_baseline_message_lists_attempts() {
        let err = StoreError::NoBaseline(vec![
            LoadAttempt {
                path: PathBuf::from("/a.dat"),
                reason: "not found".to_string(),
            },
            LoadAttempt {
                path: PathBuf::from("/b.dat"),
                reason: "snapshot is truncated".to_string(),
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("/a.dat: not found"));
        assert!(msg.contains("/b.dat: snapshot is truncated"));
    }

    #[test]
    fn test_replicate_keeps_encoding_variants() {
        let err = StoreError::Unencodable {
            path: PathBuf::from("/srv/a"),
            reason: "path contains a NUL byte".to_string(),
        };
        assert!(matches!(
            err.replicate(),
            StoreError::Unencodable { ref path, .. } if path == &PathBuf::from("/srv/a")
        ));
        assert!(matches!(
            StoreError::TooManyRecords { count: 7 }.replicate(),
            StoreError::TooManyRecords { count: 7 }
        ));
    }

    #[test]
    fn test_traversal_message_lists_roots() {
        let err = ScanError::Traversal(vec![RootFailure {
            root: PathBuf::from("/missing"),
            message: "No such file or directory".to_string(),
        }]);
        assert_eq!(err.failures().len(), 1);
        assert!(err.to_string().contains("/missing"));
    }
}
