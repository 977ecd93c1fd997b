//! Content digests for scanned files.
//!
//! Files are streamed through an MD5 context in fixed-size chunks so memory use
//! stays flat regardless of file size. The 16-byte digest width is part of the
//! snapshot format, see [`crate::storage::format`].

use crate::storage::Digest;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Chunk size used when streaming file contents into the hasher.
pub const CHUNK_SIZE: usize = 65536;

/// Computes the digest of an in-memory byte slice.
#[must_use]
pub fn digest_bytes(data: &[u8]) -> Digest {
    Digest(md5::compute(data).0)
}

/// Streams a file through MD5 and returns its digest.
///
/// # Errors
///
/// Returns the underlying I/O error if the file cannot be opened or a read
/// fails partway. Callers scanning whole trees treat this as a per-file skip.
pub fn digest_file(path: &Path) -> io::Result<Digest> {
    let mut file = File::open(path)?;
    let mut context = md5::Context::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let bytes_read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        context.consume(&buffer[..bytes_read]);
    }

    Ok(Digest(context.compute().0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_digest_bytes_known_vector() {
        assert_eq!(
            digest_bytes(b"").to_hex(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            digest_bytes(b"abc").to_hex(),
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[test]
    fn test_digest_file_matches_bytes() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("test.txt");
        std::fs::write(&file_path, "Test content for hashing")?;

        assert_eq!(
            digest_file(&file_path)?,
            digest_bytes(b"Test content for hashing")
        );
        Ok(())
    }

    #[test]
    fn test_digest_file_spanning_chunks() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("large.bin");
        let content: Vec<u8> = (0..CHUNK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
        std::fs::write(&file_path, &content)?;

        assert_eq!(digest_file(&file_path)?, digest_bytes(&content));
        Ok(())
    }

    #[test]
    fn test_digest_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let result = digest_file(&dir.path().join("does-not-exist"));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
