//! Binary snapshot layout.
//!
//! ```text
//! creation_time : i64   seconds since epoch
//! record_count  : i32
//! record_count times:
//!     path_len  : i32   includes the trailing NUL
//!     path      : path_len bytes, NUL-terminated
//!     mtime     : i64   seconds since epoch
//!     size      : i64   bytes
//!     digest    : 16 raw bytes (MD5)
//! ```
//!
//! Integers use host byte order so snapshots written by earlier builds of the
//! tool on the same machine load unchanged. Decoding is all-or-nothing.

use super::{DIGEST_LEN, Digest, FileRecord};
use crate::errors::StoreError;
use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Smallest encoded record: length prefix, one NUL byte, mtime, size, digest.
const MIN_RECORD_LEN: usize = 4 + 1 + 8 + 8 + DIGEST_LEN;

/// Writes `records` with the given creation time.
///
/// # Errors
///
/// Returns [`EncodeError::Store`] with [`StoreError::Unencodable`] if a path
/// contains a NUL byte or a value does not fit its field,
/// [`StoreError::TooManyRecords`] if the count does not fit, and
/// [`EncodeError::Io`] if the writer fails.
pub fn encode<W: Write>(
    writer: &mut W,
    created_at: i64,
    records: &[FileRecord],
) -> Result<(), EncodeError> {
    let count = i32::try_from(records.len()).map_err(|_| {
        EncodeError::Store(StoreError::TooManyRecords {
            count: records.len(),
        })
    })?;

    writer.write_i64::<NativeEndian>(created_at)?;
    writer.write_i32::<NativeEndian>(count)?;

    for record in records {
        let path = path_to_bytes(&record.path);
        if path.contains(&0) {
            return Err(unencodable(&record.path, "path contains a NUL byte"));
        }
        let path_len = i32::try_from(path.len() + 1)
            .map_err(|_| unencodable(&record.path, "path too long"))?;
        let size = i64::try_from(record.size_bytes)
            .map_err(|_| unencodable(&record.path, "size exceeds i64"))?;

        writer.write_i32::<NativeEndian>(path_len)?;
        writer.write_all(&path)?;
        writer.write_u8(0)?;
        writer.write_i64::<NativeEndian>(record.modified_at)?;
        writer.write_i64::<NativeEndian>(size)?;
        writer.write_all(&record.digest.0)?;
    }

    Ok(())
}

/// Encodes into a fresh buffer.
///
/// # Errors
///
/// See [`encode`].
pub fn encode_to_vec(created_at: i64, records: &[FileRecord]) -> Result<Vec<u8>, StoreError> {
    let mut buffer = Vec::with_capacity(12 + records.len() * (MIN_RECORD_LEN + 64));
    match encode(&mut buffer, created_at, records) {
        Ok(()) => Ok(buffer),
        Err(EncodeError::Store(e)) => Err(e),
        Err(EncodeError::Io(e)) => Err(StoreError::Corrupt(format!("in-memory write failed: {e}"))),
    }
}

/// Failure while encoding: either the data or the writer.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// Record could not be represented
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Writer failed
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn unencodable(path: &Path, reason: &str) -> EncodeError {
    EncodeError::Store(StoreError::Unencodable {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    })
}

/// Decodes a complete snapshot.
///
/// Nothing is returned unless every declared record parsed and no bytes
/// remain afterwards.
///
/// # Errors
///
/// Returns [`StoreError::Truncated`] when data runs out early and
/// [`StoreError::Corrupt`] for negative counts, bad path lengths, missing NUL
/// terminators, negative sizes or trailing bytes.
pub fn decode(data: &[u8]) -> Result<(i64, Vec<FileRecord>), StoreError> {
    let mut cursor = Cursor::new(data);

    let created_at = cursor.read_i64::<NativeEndian>().map_err(eof)?;
    let count = cursor.read_i32::<NativeEndian>().map_err(eof)?;
    let count = usize::try_from(count)
        .map_err(|_| StoreError::Corrupt(format!("negative record count {count}")))?;

    // Cap the up-front allocation by what the remaining bytes could hold.
    let remaining = data.len().saturating_sub(12);
    let mut records = Vec::with_capacity(count.min(remaining / MIN_RECORD_LEN));

    for i in 0..count {
        records.push(decode_record(&mut cursor, i)?);
    }

    let consumed = usize::try_from(cursor.position()).unwrap_or(usize::MAX);
    if consumed != data.len() {
        return Err(StoreError::Corrupt(format!(
            "{} trailing bytes after {count} records",
            data.len().saturating_sub(consumed)
        )));
    }

    Ok((created_at, records))
}

fn decode_record(cursor: &mut Cursor<&[u8]>, index: usize) -> Result<FileRecord, StoreError> {
    let path_len = cursor.read_i32::<NativeEndian>().map_err(eof)?;
    let path_len = usize::try_from(path_len)
        .ok()
        .filter(|&len| len >= 1)
        .ok_or_else(|| StoreError::Corrupt(format!("record {index}: bad path length {path_len}")))?;

    let remaining = cursor.get_ref().len() as u64 - cursor.position();
    if path_len as u64 > remaining {
        return Err(StoreError::Truncated);
    }

    let mut path = vec![0u8; path_len];
    cursor.read_exact(&mut path).map_err(eof)?;
    if path.pop() != Some(0) {
        return Err(StoreError::Corrupt(format!(
            "record {index}: path is not NUL-terminated"
        )));
    }
    if path.contains(&0) {
        return Err(StoreError::Corrupt(format!(
            "record {index}: path contains an embedded NUL"
        )));
    }

    let modified_at = cursor.read_i64::<NativeEndian>().map_err(eof)?;
    let size = cursor.read_i64::<NativeEndian>().map_err(eof)?;
    let size_bytes = u64::try_from(size)
        .map_err(|_| StoreError::Corrupt(format!("record {index}: negative size {size}")))?;

    let mut digest = [0u8; DIGEST_LEN];
    cursor.read_exact(&mut digest).map_err(eof)?;

    Ok(FileRecord::new(
        bytes_to_path(path)?,
        modified_at,
        size_bytes,
        Digest(digest),
    ))
}

fn eof(e: io::Error) -> StoreError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        StoreError::Truncated
    } else {
        StoreError::Corrupt(e.to_string())
    }
}

/// Reads a whole snapshot from `reader`.
///
/// # Errors
///
/// See [`decode`]; read failures surface as [`StoreError::Corrupt`].
pub fn decode_from<R: Read>(reader: &mut R) -> Result<(i64, Vec<FileRecord>), StoreError> {
    let mut data = Vec::new();
    reader
        .read_to_end(&mut data)
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;
    decode(&data)
}

#[cfg(unix)]
fn path_to_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
fn path_to_bytes(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

#[cfg(unix)]
#[allow(clippy::unnecessary_wraps)]
fn bytes_to_path(bytes: Vec<u8>) -> Result<PathBuf, StoreError> {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;
    Ok(PathBuf::from(OsString::from_vec(bytes)))
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: Vec<u8>) -> Result<PathBuf, StoreError> {
    String::from_utf8(bytes)
        .map(PathBuf::from)
        .map_err(|_| StoreError::Corrupt("path is not valid UTF-8".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn sample() -> Vec<FileRecord> {
        vec![
            FileRecord::new(PathBuf::from("/srv/a.txt"), 1_700_000_000, 1, Digest([1; 16])),
            FileRecord::new(PathBuf::from("/srv/sub/b.txt"), 1_700_000_100, 2, Digest([2; 16])),
        ]
    }

    #[test]
    fn test_layout_matches_native_fields() -> Result<()> {
        let records = vec![FileRecord::new(
            PathBuf::from("/a"),
            7,
            3,
            Digest([0xab; 16]),
        )];
        let bytes = encode_to_vec(99, &records)?;

        assert_eq!(bytes.len(), 8 + 4 + 4 + 3 + 8 + 8 + 16);
        assert_eq!(&bytes[0..8], &99i64.to_ne_bytes());
        assert_eq!(&bytes[8..12], &1i32.to_ne_bytes());
        assert_eq!(&bytes[12..16], &3i32.to_ne_bytes());
        assert_eq!(&bytes[16..19], b"/a\0");
        assert_eq!(&bytes[19..27], &7i64.to_ne_bytes());
        assert_eq!(&bytes[27..35], &3i64.to_ne_bytes());
        assert_eq!(&bytes[35..], &[0xab; 16]);
        Ok(())
    }

    #[test]
    fn test_decode_round_trip() -> Result<()> {
        let bytes = encode_to_vec(1234, &sample())?;
        let (created_at, records) = decode(&bytes)?;
        assert_eq!(created_at, 1234);
        assert_eq!(records, sample());
        Ok(())
    }

    #[test]
    fn test_empty_snapshot() -> Result<()> {
        let bytes = encode_to_vec(5, &[])?;
        assert_eq!(bytes.len(), 12);
        let (created_at, records) = decode(&bytes)?;
        assert_eq!(created_at, 5);
        assert!(records.is_empty());
        Ok(())
    }

    #[test]
    fn test_every_truncation_is_rejected() -> Result<()> {
        let bytes = encode_to_vec(1234, &sample())?;
        for len in 0..bytes.len() {
            assert!(
                decode(&bytes[..len]).is_err(),
                "prefix of {len} bytes decoded"
            );
        }
        Ok(())
    }

    #[test]
    fn test_count_larger_than_data_is_truncated() -> Result<()> {
        let mut bytes = encode_to_vec(1, &sample())?;
        bytes[8..12].copy_from_slice(&3i32.to_ne_bytes());
        assert!(matches!(decode(&bytes), Err(StoreError::Truncated)));
        Ok(())
    }

    #[test]
    fn test_negative_count_is_corrupt() -> Result<()> {
        let mut bytes = encode_to_vec(1, &[])?;
        bytes[8..12].copy_from_slice(&(-1i32).to_ne_bytes());
        assert!(matches!(decode(&bytes), Err(StoreError::Corrupt(_))));
        Ok(())
    }

    #[test]
    fn test_huge_path_length_does_not_allocate() -> Result<()> {
        let mut bytes = encode_to_vec(1, &sample())?;
        bytes[12..16].copy_from_slice(&i32::MAX.to_ne_bytes());
        assert!(matches!(decode(&bytes), Err(StoreError::Truncated)));
        Ok(())
    }

    #[test]
    fn test_missing_nul_terminator_is_corrupt() -> Result<()> {
        let mut bytes = encode_to_vec(1, &sample())?;
        // "/srv/a.txt\0" starts at offset 16 and is 11 bytes long.
        bytes[26] = b'x';
        assert!(matches!(decode(&bytes), Err(StoreError::Corrupt(_))));
        Ok(())
    }

    #[test]
    fn test_trailing_bytes_are_corrupt() -> Result<()> {
        let mut bytes = encode_to_vec(1, &sample())?;
        bytes.push(0);
        assert!(matches!(decode(&bytes), Err(StoreError::Corrupt(_))));
        Ok(())
    }

    #[test]
    fn test_nul_in_path_is_unencodable() {
        let records = vec![FileRecord::new(
            PathBuf::from("/bad\0path"),
            0,
            0,
            Digest([0; 16]),
        )];
        assert!(matches!(
            encode_to_vec(0, &records),
            Err(StoreError::Unencodable { .. })
        ));
    }
}
