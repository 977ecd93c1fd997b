//! Command-line interface definitions for filemon.
//!
//! This module contains all CLI argument parsing structures using clap's derive macros.
//! The definitions are shared between the `fm` binary and the xtask man page generator.
//!
//! Note: Field-level documentation is provided via clap attributes (#[arg(help = "...")]),
//! so we allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for filemon.
#[derive(Parser)]
#[command(
    name = "fm",
    version = crate::VERSION,
    about = "File-integrity baseline and change detection",
    long_about = "Snapshot directory trees (path, mtime, size, MD5) and later report \
                  files that changed, appeared or disappeared.\n\n\
                  Exit codes: 0 = no changes, 1 = error, 2 = changes detected."
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create a baseline (with MD5 hashes) of the given directories
    Baseline {
        #[command(flatten)]
        scan: ScanArgs,

        /// Delete existing baseline files before creating the new one
        #[arg(short = 'R', long)]
        reset: bool,
    },

    /// Check the given directories for changes against the baseline
    Check {
        #[command(flatten)]
        scan: ScanArgs,

        /// Delete existing baseline files before checking
        #[arg(short = 'R', long)]
        reset: bool,
    },

    /// Delete the baseline file(s)
    Reset {
        #[command(flatten)]
        storage: StorageArgs,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by `baseline` and `check`.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Directories to scan (comma-separated lists allowed)
    #[arg(required = true, value_delimiter = ',')]
    pub dirs: Vec<String>,

    /// Exclude paths containing this substring (repeatable, comma-separated)
    #[arg(short, long = "exclude", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Snapshot location overrides
    #[command(flatten)]
    pub storage: StorageArgs,

    /// Number of digest worker threads
    #[arg(long)]
    pub threads: Option<usize>,
}

/// Snapshot location options.
#[derive(Args, Debug, Clone, Default)]
pub struct StorageArgs {
    /// Baseline file path(s), comma-separated; replaces the configured locations
    #[arg(short = 'b', long = "baseline-file", value_delimiter = ',')]
    pub baseline_files: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_comma_separated_values() {
        let cli = Cli::parse_from([
            "fm",
            "check",
            "/etc,/usr/bin",
            "-e",
            "/etc/ssl/,.swp",
            "-e",
            "cache",
            "-b",
            "/a.dat,/b.dat",
        ]);
        let Commands::Check { scan, reset } = cli.command else {
            panic!("expected check");
        };
        assert!(!reset);
        assert_eq!(scan.dirs, vec!["/etc", "/usr/bin"]);
        assert_eq!(scan.exclude, vec!["/etc/ssl/", ".swp", "cache"]);
        assert_eq!(
            scan.storage.baseline_files,
            vec![PathBuf::from("/a.dat"), PathBuf::from("/b.dat")]
        );
    }

    #[test]
    fn test_baseline_requires_directories() {
        assert!(Cli::try_parse_from(["fm", "baseline"]).is_err());
    }
}
