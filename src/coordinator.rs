//! Build and check passes.
//!
//! Both passes share one pipeline: walk the roots sequentially, then digest
//! and classify the discovered files on the worker pool. A build pass turns
//! every readable file into a record. A check pass compares each file against
//! a loaded baseline and, once every worker has finished, reports baseline
//! records that were never encountered as deleted.
//!
//! Files that cannot be read are skipped and only show up in
//! [`ScanOutcome::unreadable`].
//! A root that cannot be traversed fails the whole pass, after the remaining
//! roots have still been walked.

use crate::errors::{RootFailure, ScanError};
use crate::scanner::{Candidate, ExclusionSet, TreeWalker, WalkItem};
use crate::storage::{Baseline, Digest, FileRecord, SeenTracker};
use crate::utils::hash::digest_file;
use crate::utils::thread_pool;
use rayon::prelude::*;
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, info, span};

/// An old/new pair for one changed attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta<T> {
    /// Value recorded in the baseline
    pub old: T,
    /// Value observed now
    pub new: T,
}

impl<T: PartialEq + Copy> Delta<T> {
    fn between(old: T, new: T) -> Option<Self> {
        (old != new).then_some(Self { old, new })
    }
}

/// A non-unchanged classification produced by a check pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// File exists in the baseline but differs; only differing attributes are set
    Changed {
        /// File path
        path: PathBuf,
        /// Modification time change, in seconds
        modified_at: Option<Delta<i64>>,
        /// Size change, in bytes
        size_bytes: Option<Delta<u64>>,
        /// Content digest change
        digest: Option<Delta<Digest>>,
    },
    /// File on disk with no baseline record
    New {
        /// File path
        path: PathBuf,
        /// Digest of the current contents
        digest: Digest,
    },
    /// Baseline record whose file was not encountered
    Deleted {
        /// File path
        path: PathBuf,
    },
}

impl ChangeEvent {
    /// Path the event is about.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Changed { path, .. } | Self::New { path, .. } | Self::Deleted { path } => path,
        }
    }
}

/// Overall verdict of a completed check pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Every observed file matched the baseline
    Clean,
    /// At least one new, changed or deleted file
    ChangesFound,
}

/// Result of one check pass.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// New, changed and deleted classifications, in no particular order
    pub events: Vec<ChangeEvent>,
    /// Files that matched their record exactly
    pub unchanged: usize,
    /// Files skipped because they could not be read
    pub unreadable: usize,
}

impl ScanOutcome {
    /// New + changed + deleted.
    #[must_use]
    pub fn change_count(&self) -> usize {
        self.events.len()
    }

    /// Number of files classified new.
    #[must_use]
    pub fn new_count(&self) -> usize {
        self.count(|e| matches!(e, ChangeEvent::New { .. }))
    }

    /// Number of files classified changed.
    #[must_use]
    pub fn changed_count(&self) -> usize {
        self.count(|e| matches!(e, ChangeEvent::Changed { .. }))
    }

    /// Number of files classified deleted.
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.count(|e| matches!(e, ChangeEvent::Deleted { .. }))
    }

    fn count(&self, pred: impl Fn(&ChangeEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    /// Clean when no change was counted.
    #[must_use]
    pub fn status(&self) -> CheckStatus {
        if self.change_count() == 0 {
            CheckStatus::Clean
        } else {
            CheckStatus::ChangesFound
        }
    }

    /// Events ordered by path, for stable reports.
    #[must_use]
    pub fn sorted_events(&self) -> Vec<&ChangeEvent> {
        let mut events: Vec<_> = self.events.iter().collect();
        events.sort_by(|a, b| a.path().cmp(b.path()));
        events
    }
}

/// Roots and exclusions for a pass, owned by the caller.
#[derive(Debug, Clone)]
pub struct ScanContext {
    /// Directories (or single files) to scan
    pub roots: Vec<PathBuf>,
    /// Active exclusions
    pub exclusions: ExclusionSet,
}

impl ScanContext {
    /// Creates a context.
    #[must_use]
    pub const fn new(roots: Vec<PathBuf>, exclusions: ExclusionSet) -> Self {
        Self { roots, exclusions }
    }

    /// Runs a build pass. See [`build_baseline`].
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Traversal`] if any root failed.
    pub fn build_baseline(&self) -> Result<Baseline, ScanError> {
        build_baseline(&self.roots, &self.exclusions)
    }

    /// Runs a check pass. See [`check`].
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Traversal`] if any root failed.
    pub fn check(&self, baseline: &Baseline) -> Result<ScanOutcome, ScanError> {
        check(&self.roots, &self.exclusions, baseline)
    }
}

/// Walks every root, collecting eligible files and root failures.
///
/// A file reached twice under the same path string (overlapping roots) is
/// kept once. Spellings such as `/d/./a` and `/d/a` stay distinct, matching
/// how the baseline keys its records.
fn discover(roots: &[PathBuf], exclusions: &ExclusionSet) -> (Vec<Candidate>, Vec<RootFailure>) {
    let mut candidates = Vec::new();
    let mut failures = Vec::new();
    let mut visited: HashSet<OsString> = HashSet::new();

    for item in TreeWalker::new(roots, exclusions).walk() {
        match item {
            WalkItem::File(candidate) => {
                if visited.insert(candidate.path.as_os_str().to_owned()) {
                    candidates.push(candidate);
                }
            }
            WalkItem::RootFailed(failure) => failures.push(failure),
        }
    }

    (candidates, failures)
}

/// Digests a candidate, or `None` if it could not be read.
fn digest_candidate(candidate: &Candidate) -> Option<Digest> {
    match digest_file(&candidate.path) {
        Ok(digest) => Some(digest),
        Err(e) => {
            debug!(path = %candidate.path.display(), error = %e, "skipping unreadable file");
            None
        }
    }
}

/// Builds a fresh baseline from every readable file under `roots`.
///
/// No baseline is returned if any root failed, so a partial snapshot can
/// never be persisted.
///
/// # Errors
///
/// Returns [`ScanError::Traversal`] listing the failed roots.
pub fn build_baseline(
    roots: &[PathBuf],
    exclusions: &ExclusionSet,
) -> Result<Baseline, ScanError> {
    let span = span!(Level::INFO, "build", roots = roots.len());
    let _guard = span.enter();

    let (candidates, failures) = discover(roots, exclusions);

    let records: Vec<FileRecord> = thread_pool::run_in_pool(|| {
        candidates
            .par_iter()
            .filter_map(|candidate| {
                let digest = digest_candidate(candidate)?;
                Some(FileRecord::new(
                    candidate.path.clone(),
                    candidate.modified_at,
                    candidate.size_bytes,
                    digest,
                ))
            })
            .collect()
    });

    if !failures.is_empty() {
        return Err(ScanError::Traversal(failures));
    }

    let mut baseline = Baseline::new();
    for record in records {
        baseline.insert(record);
    }

    info!(
        discovered = candidates.len(),
        recorded = baseline.len(),
        "build pass complete"
    );
    Ok(baseline)
}

/// Classification of one file during a check pass.
enum Observation {
    Unchanged,
    Unreadable,
    Event(ChangeEvent),
}

fn classify(candidate: &Candidate, tracker: &SeenTracker<'_>) -> Observation {
    // Marked before digesting: an unreadable file is still present on disk
    // and must not be reported deleted.
    let record = tracker.find_and_mark(&candidate.path);

    let Some(digest) = digest_candidate(candidate) else {
        return Observation::Unreadable;
    };

    let Some(record) = record else {
        return Observation::Event(ChangeEvent::New {
            path: candidate.path.clone(),
            digest,
        });
    };

    let modified_at = Delta::between(record.modified_at, candidate.modified_at);
    let size_bytes = Delta::between(record.size_bytes, candidate.size_bytes);
    let digest = Delta::between(record.digest, digest);

    if modified_at.is_none() && size_bytes.is_none() && digest.is_none() {
        Observation::Unchanged
    } else {
        Observation::Event(ChangeEvent::Changed {
            path: candidate.path.clone(),
            modified_at,
            size_bytes,
            digest,
        })
    }
}

/// Compares every readable file under `roots` against `baseline`.
///
/// Baseline records not encountered during the walk, and not covered by
/// `exclusions`, are reported as deleted.
///
/// # Errors
///
/// Returns [`ScanError::Traversal`] listing the failed roots; deleted-file
/// accounting is not performed in that case.
pub fn check(
    roots: &[PathBuf],
    exclusions: &ExclusionSet,
    baseline: &Baseline,
) -> Result<ScanOutcome, ScanError> {
    let span = span!(Level::INFO, "check", roots = roots.len(), records = baseline.len());
    let _guard = span.enter();

    let (candidates, failures) = discover(roots, exclusions);
    let tracker = baseline.seen_tracker();

    let observations: Vec<Observation> = thread_pool::run_in_pool(|| {
        candidates
            .par_iter()
            .map(|candidate| classify(candidate, &tracker))
            .collect()
    });

    if !failures.is_empty() {
        return Err(ScanError::Traversal(failures));
    }

    let mut outcome = ScanOutcome::default();
    for observation in observations {
        match observation {
            Observation::Unchanged => outcome.unchanged += 1,
            Observation::Unreadable => outcome.unreadable += 1,
            Observation::Event(event) => outcome.events.push(event),
        }
    }

    // Only after every worker joined is the seen set complete.
    outcome.events.extend(
        tracker
            .unseen_records(exclusions)
            .into_iter()
            .map(|record| ChangeEvent::Deleted {
                path: record.path.clone(),
            }),
    );

    info!(
        unchanged = outcome.unchanged,
        changes = outcome.change_count(),
        "check pass complete"
    );
    Ok(outcome)
}
