//! Utility functions and helpers.
//!
//! # Submodules
//!
//! - [`formatters`]: Timestamp and count formatting for reports
//! - [`hash`]: Streaming MD5 content digests
//! - [`thread_pool`]: Bounded worker pool for parallel digesting

/// Report formatting helpers
pub mod formatters;
/// Content digest provider
pub mod hash;
/// Thread pool configuration for parallel operations
pub mod thread_pool;

use anyhow::Result;
use std::path::PathBuf;

/// Expands a path starting with `~` to the user's home directory.
///
/// # Errors
///
/// Returns an error if the path is empty.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    if path.is_empty() {
        anyhow::bail!("Path cannot be empty");
    }
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(path))
}

/// Turns a scan root into the absolute form recorded in baselines.
///
/// Relative roots are joined onto the current directory without resolving
/// symlinks, so the walk stays physical.
///
/// # Errors
///
/// Returns an error if the path is empty or the current directory is unavailable.
pub fn absolute_root(path: &str) -> Result<PathBuf> {
    let expanded = expand_tilde(path)?;
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(std::env::current_dir()?.join(expanded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde_rejects_empty() {
        assert!(expand_tilde("").is_err());
    }

    #[test]
    fn test_expand_tilde_plain_path() -> Result<()> {
        assert_eq!(expand_tilde("/etc/hosts")?, PathBuf::from("/etc/hosts"));
        Ok(())
    }

    #[test]
    fn test_absolute_root_relative() -> Result<()> {
        let root = absolute_root("some/dir")?;
        assert!(root.is_absolute());
        assert!(root.ends_with("some/dir"));
        Ok(())
    }
}
