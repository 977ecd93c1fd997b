use chrono::{Local, TimeZone};

/// Formats a Unix timestamp (seconds) the way change reports show mtimes,
/// e.g. `20240131_235959`, in local time.
///
/// Timestamps chrono cannot represent fall back to the raw second count.
#[must_use]
pub fn format_mtime(secs: i64) -> String {
    Local.timestamp_opt(secs, 0).single().map_or_else(
        || secs.to_string(),
        |dt| dt.format("%Y%m%d_%H%M%S").to_string(),
    )
}

/// Formats a baseline creation time for the "Baseline loaded" banner.
#[must_use]
pub fn format_created_at(secs: i64) -> String {
    Local.timestamp_opt(secs, 0).single().map_or_else(
        || secs.to_string(),
        |dt| dt.format("%a %b %e %H:%M:%S %Y").to_string(),
    )
}

/// Renders a pluralized file count: `1 file`, `3 files`.
#[must_use]
pub fn format_file_count(count: usize) -> String {
    if count == 1 {
        "1 file".to_string()
    } else {
        format!("{count} files")
    }
}
