//! Substring-based path exclusion.
//!
//! A path is excluded when any pattern occurs anywhere in it, byte for byte.
//! Matching is deliberately coarse: `tmp` also excludes `/usr/tmpfiles/x`.
//! There is no glob or path-segment awareness.

use memchr::memmem;
use std::path::Path;

/// Prefixes excluded from every scan regardless of configuration.
pub const SYSTEM_EXCLUSIONS: &[&str] = &["/tmp/", "/var/log/", "/proc/", "/sys/", "/dev/"];

/// Operator exclusions plus the fixed system prefixes.
///
/// The system prefixes cannot be switched off; every constructor outside
/// unit tests includes them.
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    patterns: Vec<String>,
    include_system: bool,
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ExclusionSet {
    /// Builds the set used for real scans: `patterns` plus [`SYSTEM_EXCLUSIONS`].
    #[must_use]
    pub fn new(patterns: Vec<String>) -> Self {
        Self {
            patterns: normalize(patterns),
            include_system: true,
        }
    }

    /// Set without the system prefixes, for fixture trees under `/tmp/`.
    #[cfg(test)]
    pub(crate) fn operator_only(patterns: Vec<String>) -> Self {
        Self {
            patterns: normalize(patterns),
            include_system: false,
        }
    }

    /// Operator-supplied patterns in the order given.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// True if `path` contains any operator pattern or system prefix.
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        let haystack = path_bytes(path);
        let system: &[&str] = if self.include_system {
            SYSTEM_EXCLUSIONS
        } else {
            &[]
        };

        self.patterns
            .iter()
            .map(String::as_str)
            .chain(system.iter().copied())
            .any(|needle| memmem::find(&haystack, needle.as_bytes()).is_some())
    }
}

/// Empty patterns would match every path; they are dropped.
fn normalize(patterns: Vec<String>) -> Vec<String> {
    patterns.into_iter().filter(|p| !p.is_empty()).collect()
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> std::borrow::Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    std::borrow::Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> std::borrow::Cow<'_, [u8]> {
    match path.to_string_lossy() {
        std::borrow::Cow::Borrowed(s) => std::borrow::Cow::Borrowed(s.as_bytes()),
        std::borrow::Cow::Owned(s) => std::borrow::Cow::Owned(s.into_bytes()),
    }
}
