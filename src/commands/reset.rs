use super::ExitStatus;
use crate::output;
use crate::storage::locations::{self, ResetOutcome};
use std::path::PathBuf;

/// Deletes every baseline location.
///
/// Succeeds only if each location was removed or was already absent.
#[must_use]
pub fn execute(locations: &[PathBuf]) -> ExitStatus {
    let results = locations::reset(locations);

    for (path, result) in &results {
        match result {
            Ok(ResetOutcome::Removed) => {
                output::success(&format!("Baseline file deleted: {}", path.display()));
            }
            Ok(ResetOutcome::Absent) => {
                output::info(&format!("Baseline file not found: {}", path.display()));
            }
            Err(e) => super::print_error(&format!("Failed to delete baseline file: {e}")),
        }
    }

    if locations::all_succeeded(&results) {
        ExitStatus::Success
    } else {
        ExitStatus::Failure
    }
}

/// Reset run ahead of a build or check; failures are only warnings.
pub fn execute_before_scan(locations: &[PathBuf]) {
    if execute(locations) == ExitStatus::Failure {
        output::warning("Continuing although some baseline files could not be deleted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_reset_missing_file_succeeds() {
        let dir = tempdir().unwrap();
        assert_eq!(
            execute(&[dir.path().join("absent.dat")]),
            ExitStatus::Success
        );
    }

    #[test]
    fn test_reset_removes_file() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("baseline.dat");
        std::fs::write(&path, b"data")?;

        assert_eq!(execute(std::slice::from_ref(&path)), ExitStatus::Success);
        assert!(!path.exists());
        Ok(())
    }
}
