#![warn(missing_docs)]
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # Filemon - File-Integrity Baseline Engine
//!
//! Filemon snapshots the regular files under a set of directory trees (path,
//! modification time, size, MD5 digest), persists that snapshot, and later
//! re-scans the same trees to classify every observed file as unchanged,
//! changed, new or deleted.
//!
//! Baseline and check are separate, explicitly invoked passes; there is no
//! watcher daemon.
//!
//! ## Architecture
//!
//! - [`utils::hash`]: streaming content digests
//! - [`scanner`]: substring exclusions and physical tree walking
//! - [`storage`]: baseline records, the binary snapshot format and
//!   multi-location persistence
//! - [`coordinator`]: build and check passes, classification events
//! - [`config`], [`output`], [`cli`], [`commands`]: the `fm` front end
//!
//! ## Example Usage
//!
//! ```no_run
//! use filemon::coordinator::{self, CheckStatus};
//! use filemon::scanner::ExclusionSet;
//! use filemon::storage::locations;
//! use std::path::PathBuf;
//!
//! # fn main() -> anyhow::Result<()> {
//! let roots = vec![PathBuf::from("/etc")];
//! let exclusions = ExclusionSet::new(vec!["/etc/ssl/".to_string()]);
//! let snapshot = vec![PathBuf::from("/var/lib/fm/baseline.dat")];
//!
//! let baseline = coordinator::build_baseline(&roots, &exclusions)?;
//! for (path, result) in locations::save(&baseline, &snapshot) {
//!     result.map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;
//! }
//!
//! let loaded = locations::load(&snapshot)?;
//! let outcome = coordinator::check(&roots, &exclusions, &loaded)?;
//! if outcome.status() == CheckStatus::ChangesFound {
//!     println!("{} file(s) changed", outcome.change_count());
//! }
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Command implementations driven by the `fm` binary.
pub mod commands;

/// Configuration loading and validation.
pub mod config;

/// Build and check passes over scan roots.
pub mod coordinator;

/// Error types for storage and scanning.
pub mod errors;

/// Output formatting and verbosity control.
pub mod output;

/// Path exclusion and directory traversal.
pub mod scanner;

/// Baseline records, snapshot format and persistence.
pub mod storage;

/// Utility functions and helpers.
pub mod utils;

use anyhow::Result;
use scanner::ExclusionSet;
use std::path::PathBuf;

/// Current version of the fm binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Settings shared by every command: the loaded configuration and where it
/// came from.
///
/// There is no process-wide state; independent scans can each use their own
/// context.
#[derive(Debug, Clone)]
pub struct FmContext {
    /// Path the configuration was loaded from.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,
}

impl FmContext {
    /// Loads the configuration from `$FM_CONFIG_PATH` or the default path.
    ///
    /// # Errors
    /// Returns an error if the path cannot be resolved or the file is invalid.
    pub fn new() -> Result<Self> {
        let config_path = config::Config::default_path()?;
        Self::with_config_path(config_path)
    }

    /// Loads the configuration from an explicit path.
    ///
    /// Unknown keys are reported as warnings rather than errors.
    ///
    /// # Errors
    /// Returns an error if the file exists but is invalid.
    pub fn with_config_path(config_path: PathBuf) -> Result<Self> {
        let config = config::Config::load(&config_path)?;

        match config::validator::ConfigValidator::new().unknown_fields(&config_path) {
            Ok(unknown) => {
                for field in unknown {
                    output::warning(&format!("Unknown configuration field: {field}"));
                }
            }
            Err(e) => tracing::debug!(error = %e, "config validation skipped"),
        }

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Creates a context around an in-memory configuration.
    #[must_use]
    pub const fn from_config(config_path: PathBuf, config: config::Config) -> Self {
        Self {
            config_path,
            config,
        }
    }

    /// Snapshot locations: `overrides` if any were given, else the configured ones.
    #[must_use]
    pub fn baseline_locations(&self, overrides: &[PathBuf]) -> Vec<PathBuf> {
        if overrides.is_empty() {
            self.config.storage.baseline_files.clone()
        } else {
            overrides.to_vec()
        }
    }

    /// Configured exclusions followed by `extra`, plus the fixed system prefixes.
    #[must_use]
    pub fn exclusion_set(&self, extra: &[String]) -> ExclusionSet {
        let patterns = self
            .config
            .scan
            .exclude
            .iter()
            .chain(extra)
            .cloned()
            .collect();
        ExclusionSet::new(patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn context() -> FmContext {
        let mut config = config::Config::default();
        config.scan.exclude = vec!["/srv/cache/".to_string()];
        FmContext::from_config(PathBuf::from("/nonexistent/config.toml"), config)
    }

    #[test]
    fn test_baseline_locations_override() {
        let ctx = context();
        assert_eq!(
            ctx.baseline_locations(&[]),
            vec![PathBuf::from(config::DEFAULT_BASELINE_FILE)]
        );
        let custom = vec![PathBuf::from("/a.dat")];
        assert_eq!(ctx.baseline_locations(&custom), custom);
    }

    #[test]
    fn test_exclusion_set_merges_config_and_cli() {
        let ctx = context();
        let set = ctx.exclusion_set(&[".swp".to_string()]);
        assert_eq!(set.patterns(), &["/srv/cache/".to_string(), ".swp".to_string()]);
        assert!(set.is_excluded(Path::new("/srv/cache/x")));
        assert!(set.is_excluded(Path::new("/home/u/.vimrc.swp")));
        assert!(set.is_excluded(Path::new("/proc/self/status")));
        assert!(!set.is_excluded(Path::new("/srv/app/x")));
    }
}
