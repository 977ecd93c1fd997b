/// `fm baseline`
pub mod baseline;
/// `fm check`
pub mod check;
/// `fm reset`
pub mod reset;

use crate::scanner::ExclusionSet;
use crate::utils::absolute_root;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

/// Process-level result of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Completed; for `check`, nothing changed
    Success,
    /// Operational error (missing baseline, failed root, failed location)
    Failure,
    /// `check` completed and found changes
    ChangesFound,
}

impl ExitStatus {
    /// Numeric process exit code: 0, 1 or 2.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::ChangesFound => 2,
        }
    }
}

/// Resolves CLI directory arguments into absolute scan roots.
///
/// # Errors
/// Returns an error if a directory argument is empty.
pub fn resolve_roots(dirs: &[String]) -> Result<Vec<PathBuf>> {
    dirs.iter().map(|d| absolute_root(d)).collect()
}

/// Prints a debug summary of the active exclusions.
pub fn describe_exclusions(exclusions: &ExclusionSet) {
    if !exclusions.patterns().is_empty() {
        crate::output::verbose(&format!(
            "Excluding paths containing: {}",
            exclusions.patterns().join(", ")
        ));
    }
}

/// Prints a green check mark and `message` to stdout.
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints a red cross and `message` to stderr. The mark is the only prefix.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitStatus::Success.code(), 0);
        assert_eq!(ExitStatus::Failure.code(), 1);
        assert_eq!(ExitStatus::ChangesFound.code(), 2);
    }

    #[test]
    fn test_resolve_roots_absolute() -> Result<()> {
        let roots = resolve_roots(&["/etc".to_string(), "rel".to_string()])?;
        assert_eq!(roots[0], PathBuf::from("/etc"));
        assert!(roots[1].is_absolute());
        Ok(())
    }
}
