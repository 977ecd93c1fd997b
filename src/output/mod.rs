//! Terminal status messages for the `fm` front end.
//!
//! Everything here goes to stderr. Change reports are written to stdout by
//! the `check` command so they can be piped without status noise.
//!
//! Verbosity and color are process-wide switches set once from the command
//! line and configuration.

use colored::Colorize;
use std::sync::atomic::{AtomicU8, Ordering};

/// How much status output to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Warnings and errors only
    Quiet = 0,
    /// Progress and result lines
    Normal = 1,
    /// Also resolved settings such as active exclusions
    Verbose = 2,
}

impl Verbosity {
    /// Picks the level from `-v` / `-q`; `-v` wins if both are given.
    #[must_use]
    pub const fn from_flags(verbose: bool, quiet: bool) -> Self {
        if verbose {
            Self::Verbose
        } else if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Quiet,
            2 => Self::Verbose,
            _ => Self::Normal,
        }
    }
}

static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Normal as u8);

/// Sets the level used by every helper below.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Current level.
pub fn get_verbosity() -> Verbosity {
    Verbosity::from_u8(VERBOSITY.load(Ordering::Relaxed))
}

fn shows(level: Verbosity) -> bool {
    get_verbosity() >= level
}

/// Forces ANSI colors on or off for stdout and stderr alike.
pub fn set_color(enabled: bool) {
    colored::control::set_override(enabled);
}

/// Green line for a completed step, e.g. a deleted baseline file.
pub fn success(message: &str) {
    if shows(Verbosity::Normal) {
        eprintln!("{}", message.green());
    }
}

/// Routine progress line, dimmed.
pub fn info(message: &str) {
    if shows(Verbosity::Normal) {
        eprintln!("{}", message.dimmed());
    }
}

/// Detail only shown with `-v`.
pub fn verbose(message: &str) {
    if shows(Verbosity::Verbose) {
        eprintln!("{}", message.dimmed());
    }
}

/// Always shown, bold yellow.
pub fn warning(message: &str) {
    eprintln!("{}", message.yellow().bold());
}

/// Always shown, bold red.
pub fn error(message: &str) {
    eprintln!("{}", message.red().bold());
}
