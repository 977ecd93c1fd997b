use super::FileRecord;
use crate::scanner::filter::ExclusionSet;
use dashmap::DashSet;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;
use tracing::warn;

/// A snapshot of file records plus the time it was taken.
///
/// Paths are unique within a baseline, compared byte for byte: `/srv/./a` and
/// `/srv/a` are different records. Records keep insertion order, which is
/// also the order they are written to disk.
#[derive(Debug, Clone, Default)]
pub struct Baseline {
    /// Seconds since the epoch when the snapshot was saved; `None` while a
    /// fresh baseline is still being built
    created_at: Option<i64>,
    records: Vec<FileRecord>,
    by_path: HashMap<OsString, usize>,
}

impl Baseline {
    /// Creates an empty baseline for a build pass.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a baseline from decoded snapshot contents.
    ///
    /// Later records repeating an earlier path are dropped so the uniqueness
    /// invariant holds even for snapshots written by overlapping roots.
    #[must_use]
    pub fn from_records(created_at: i64, records: Vec<FileRecord>) -> Self {
        let mut baseline = Self {
            created_at: Some(created_at),
            records: Vec::with_capacity(records.len()),
            by_path: HashMap::with_capacity(records.len()),
        };
        for record in records {
            let path = record.path.clone();
            if !baseline.insert(record) {
                warn!(path = %path.display(), "dropping duplicate record from snapshot");
            }
        }
        baseline
    }

    /// Appends a record.
    ///
    /// Returns `false` and leaves the baseline untouched if the path is
    /// already present.
    pub fn insert(&mut self, record: FileRecord) -> bool {
        if self.by_path.contains_key(record.path.as_os_str()) {
            return false;
        }
        self.by_path
            .insert(record.path.as_os_str().to_owned(), self.records.len());
        self.records.push(record);
        true
    }

    /// Exact-match lookup by the path's bytes; no normalization is applied.
    #[must_use]
    pub fn find(&self, path: &Path) -> Option<&FileRecord> {
        self.position(path).map(|i| &self.records[i])
    }

    fn position(&self, path: &Path) -> Option<usize> {
        self.by_path.get(path.as_os_str()).copied()
    }

    /// Records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the baseline holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Creation time, if this baseline was loaded or saved.
    #[must_use]
    pub const fn created_at(&self) -> Option<i64> {
        self.created_at
    }

    /// Stamps the creation time.
    pub const fn set_created_at(&mut self, secs: i64) {
        self.created_at = Some(secs);
    }

    /// Starts tracking which records a check pass encounters.
    #[must_use]
    pub fn seen_tracker(&self) -> SeenTracker<'_> {
        SeenTracker {
            baseline: self,
            seen: DashSet::with_capacity(self.records.len()),
        }
    }
}

/// Tracks which baseline records were encountered during one check pass.
///
/// Marking is safe from any number of worker threads.
#[derive(Debug)]
pub struct SeenTracker<'a> {
    baseline: &'a Baseline,
    seen: DashSet<usize>,
}

impl<'a> SeenTracker<'a> {
    /// Looks up `path` and, if present, marks it seen.
    ///
    /// Marking an already-seen path has no further effect.
    #[must_use]
    pub fn find_and_mark(&self, path: &Path) -> Option<&'a FileRecord> {
        let baseline = self.baseline;
        let index = baseline.position(path)?;
        self.seen.insert(index);
        Some(&baseline.records[index])
    }

    /// Marks `path` seen. Returns `false` if it is not in the baseline.
    pub fn mark_seen(&self, path: &Path) -> bool {
        self.find_and_mark(path).is_some()
    }

    /// Number of distinct records marked so far.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Records never marked seen, skipping those the active exclusions cover.
    ///
    /// A record excluded now is not reported as deleted even if it was
    /// recorded before the exclusion existed.
    #[must_use]
    pub fn unseen_records(&self, exclusions: &ExclusionSet) -> Vec<&'a FileRecord> {
        let baseline = self.baseline;
        baseline
            .records
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.seen.contains(i))
            .map(|(_, record)| record)
            .filter(|record| !exclusions.is_excluded(&record.path))
            .collect()
    }
}
