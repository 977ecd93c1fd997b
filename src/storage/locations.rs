//! Saving, loading and removing snapshots across several configured
//! locations.
//!
//! Load takes the first location that decodes completely. Save and reset act
//! on every location independently and report each result separately.

use super::Baseline;
use super::format;
use crate::errors::{LoadAttempt, StoreError};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Result of one per-location operation.
pub type LocationResult<T> = (PathBuf, Result<T, StoreError>);

/// What a reset did to one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The snapshot file was deleted
    Removed,
    /// Nothing existed at the location
    Absent,
}

/// Writes `baseline` to every location.
///
/// All locations get the same creation time: the baseline's own if it has
/// one, otherwise the current time. A failure on one location does not stop
/// the others.
#[must_use]
pub fn save(baseline: &Baseline, locations: &[PathBuf]) -> Vec<LocationResult<()>> {
    let created_at = baseline
        .created_at()
        .unwrap_or_else(|| chrono::Utc::now().timestamp());

    let encoded = format::encode_to_vec(created_at, baseline.records());
    let data = match encoded {
        Ok(data) => data,
        Err(e) => {
            // Encoding failures are not location specific; report on each.
            return locations
                .iter()
                .map(|path| (path.clone(), Err(e.replicate())))
                .collect();
        }
    };

    locations
        .iter()
        .map(|path| {
            let result = write_snapshot(path, &data);
            match &result {
                Ok(()) => {
                    debug!(path = %path.display(), records = baseline.len(), "baseline saved");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to save baseline");
                }
            }
            (path.clone(), result)
        })
        .collect()
}

fn write_snapshot(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let mut file = fs::File::create(path).map_err(|e| StoreError::io("create", path, e))?;
    file.write_all(data)
        .and_then(|()| file.sync_all())
        .map_err(|e| StoreError::io("write", path, e))
}

/// Loads the first location that holds a complete snapshot.
///
/// # Errors
///
/// Returns [`StoreError::NoBaseline`] listing every attempted location when
/// none of them load.
pub fn load(locations: &[PathBuf]) -> Result<Baseline, StoreError> {
    let mut attempts = Vec::new();

    for path in locations {
        match load_one(path) {
            Ok(baseline) => {
                debug!(
                    path = %path.display(),
                    records = baseline.len(),
                    "baseline loaded"
                );
                return Ok(baseline);
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "baseline location skipped");
                attempts.push(LoadAttempt {
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Err(StoreError::NoBaseline(attempts))
}

/// Loads a snapshot from a single location.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, or a decode error if it
/// is not a complete snapshot.
pub fn load_one(path: &Path) -> Result<Baseline, StoreError> {
    let data = fs::read(path).map_err(|e| StoreError::io("read", path, e))?;
    let (created_at, records) = format::decode(&data)?;
    Ok(Baseline::from_records(created_at, records))
}

/// Deletes every location.
///
/// A missing file counts as [`ResetOutcome::Absent`], not a failure.
#[must_use]
pub fn reset(locations: &[PathBuf]) -> Vec<LocationResult<ResetOutcome>> {
    locations
        .iter()
        .map(|path| {
            let result = match fs::remove_file(path) {
                Ok(()) => Ok(ResetOutcome::Removed),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ResetOutcome::Absent),
                Err(e) => Err(StoreError::io("remove", path, e)),
            };
            (path.clone(), result)
        })
        .collect()
}

/// Whether every per-location operation succeeded.
#[must_use]
pub fn all_succeeded<T>(results: &[LocationResult<T>]) -> bool {
    results.iter().all(|(_, r)| r.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Digest, FileRecord};
    use anyhow::Result;
    use tempfile::tempdir;

    fn sample_baseline() -> Baseline {
        let mut baseline = Baseline::new();
        baseline.insert(FileRecord::new(
            PathBuf::from("/srv/a.txt"),
            1_700_000_000,
            1,
            Digest([1; 16]),
        ));
        baseline
    }

    #[test]
    fn test_save_then_load() -> Result<()> {
        let dir = tempdir()?;
        let location = dir.path().join("baseline.dat");

        let results = save(&sample_baseline(), std::slice::from_ref(&location));
        assert!(all_succeeded(&results));

        let loaded = load(&[location])?;
        assert_eq!(loaded.records(), sample_baseline().records());
        assert!(loaded.created_at().is_some());
        Ok(())
    }

    #[test]
    fn test_save_keeps_existing_creation_time() -> Result<()> {
        let dir = tempdir()?;
        let location = dir.path().join("baseline.dat");
        let mut baseline = sample_baseline();
        baseline.set_created_at(1234);

        let _ = save(&baseline, std::slice::from_ref(&location));
        assert_eq!(load_one(&location)?.created_at(), Some(1234));
        Ok(())
    }

    #[test]
    fn test_save_failure_does_not_stop_other_locations() -> Result<()> {
        let dir = tempdir()?;
        let bad = dir.path().join("missing-dir").join("baseline.dat");
        let good = dir.path().join("baseline.dat");

        let results = save(&sample_baseline(), &[bad.clone(), good.clone()]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, bad);
        assert!(results[0].1.is_err());
        assert!(results[1].1.is_ok());
        assert!(!all_succeeded(&results));
        assert!(good.exists());
        Ok(())
    }

    #[test]
    fn test_unencodable_record_is_reported_on_every_location() -> Result<()> {
        let dir = tempdir()?;
        let locations = vec![dir.path().join("one.dat"), dir.path().join("two.dat")];
        let mut baseline = Baseline::new();
        baseline.insert(FileRecord::new(
            PathBuf::from("/srv/a\0b"),
            0,
            1,
            Digest([0; 16]),
        ));

        let results = save(&baseline, &locations);
        assert_eq!(results.len(), 2);
        for (path, result) in &results {
            assert!(matches!(result, Err(StoreError::Unencodable { .. })));
            assert!(!path.exists());
        }
        Ok(())
    }

    #[test]
    fn test_load_falls_through_to_first_valid() -> Result<()> {
        let dir = tempdir()?;
        let missing = dir.path().join("missing.dat");
        let garbage = dir.path().join("garbage.dat");
        let valid = dir.path().join("valid.dat");
        fs::write(&garbage, b"not a snapshot")?;
        let _ = save(&sample_baseline(), std::slice::from_ref(&valid));

        let loaded = load(&[missing, garbage, valid])?;
        assert_eq!(loaded.len(), 1);
        Ok(())
    }

    #[test]
    fn test_load_reports_every_attempt() -> Result<()> {
        let dir = tempdir()?;
        let missing = dir.path().join("missing.dat");
        let garbage = dir.path().join("garbage.dat");
        fs::write(&garbage, [0xff; 7])?;

        match load(&[missing, garbage]) {
            Err(StoreError::NoBaseline(attempts)) => assert_eq!(attempts.len(), 2),
            other => panic!("expected NoBaseline, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_load_with_no_locations() {
        assert!(matches!(load(&[]), Err(StoreError::NoBaseline(a)) if a.is_empty()));
    }

    #[test]
    fn test_reset_removed_and_absent() -> Result<()> {
        let dir = tempdir()?;
        let present = dir.path().join("present.dat");
        let absent = dir.path().join("absent.dat");
        fs::write(&present, b"x")?;

        let results = reset(&[present.clone(), absent]);
        assert!(all_succeeded(&results));
        assert!(matches!(results[0].1, Ok(ResetOutcome::Removed)));
        assert!(matches!(results[1].1, Ok(ResetOutcome::Absent)));
        assert!(!present.exists());
        Ok(())
    }

    #[test]
    fn test_reset_reports_undeletable_location() -> Result<()> {
        let dir = tempdir()?;
        // A non-empty directory cannot be removed with remove_file.
        let blocked = dir.path().join("blocked.dat");
        fs::create_dir(&blocked)?;
        fs::write(blocked.join("inner"), b"x")?;

        let results = reset(std::slice::from_ref(&blocked));
        assert!(!all_succeeded(&results));
        Ok(())
    }
}
