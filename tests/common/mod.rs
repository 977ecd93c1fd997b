use anyhow::Result;
use filemon::scanner::ExclusionSet;
use tempfile::TempDir;

/// Creates an empty directory for a scanned tree under the build directory.
///
/// Scans always skip the system prefixes, so a tree under `/tmp/` would be
/// invisible. Returns `None` when the build directory itself sits under one
/// of those prefixes; callers then have nothing to assert.
pub fn scan_tree() -> Result<Option<TempDir>> {
    let dir = tempfile::Builder::new()
        .prefix("fm-tree-")
        .tempdir_in(env!("CARGO_TARGET_TMPDIR"))?;
    if ExclusionSet::default().is_excluded(&dir.path().join("entry")) {
        return Ok(None);
    }
    Ok(Some(dir))
}
