/// In-memory baseline store and seen tracking
pub mod baseline;
/// Binary snapshot codec
pub mod format;
/// Saving, loading and removing snapshots across several locations
pub mod locations;

pub use baseline::{Baseline, SeenTracker};

use std::fmt;
use std::path::PathBuf;

/// Width of a content digest in bytes (MD5).
pub const DIGEST_LEN: usize = 16;

/// A 128-bit content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest(pub [u8; DIGEST_LEN]);

impl Digest {
    /// Lowercase hex rendering, 32 characters.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("{self:x}")
    }
}

impl fmt::LowerHex for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}

/// One tracked file as observed during a build pass.
///
/// Records are never updated in place; a new build produces a fresh set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute path, compared byte for byte
    pub path: PathBuf,
    /// Modification time in whole seconds since the epoch
    pub modified_at: i64,
    /// Size in bytes
    pub size_bytes: u64,
    /// Digest of the full contents
    pub digest: Digest,
}

impl FileRecord {
    /// Creates a record from scan results.
    #[must_use]
    pub const fn new(path: PathBuf, modified_at: i64, size_bytes: u64, digest: Digest) -> Self {
        Self {
            path,
            modified_at,
            size_bytes,
            digest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_hex_is_lowercase_and_padded() {
        let mut bytes = [0u8; DIGEST_LEN];
        bytes[0] = 0x0a;
        bytes[15] = 0xff;
        let hex = Digest(bytes).to_hex();
        assert_eq!(hex.len(), 32);
        assert!(hex.starts_with("0a"));
        assert!(hex.ends_with("ff"));
        assert_eq!(hex, Digest(bytes).to_string());
    }
}
