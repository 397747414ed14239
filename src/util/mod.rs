//! Small utility helpers for configuration parsing and time formatting.

pub mod config;

use chrono::{DateTime, Utc};

/// What: Convert an optional Unix timestamp (seconds) to a UTC date-time string.
///
/// Inputs:
/// - `ts`: Optional Unix timestamp in seconds since epoch.
///
/// Output:
/// - Returns a formatted string `YYYY-MM-DD HH:MM:SS` (UTC), or empty string for `None`.
///
/// Details:
/// - Timestamps chrono cannot represent are returned as their numeric string.
#[must_use]
pub fn ts_to_date(ts: Option<i64>) -> String {
    let Some(t) = ts else {
        return String::new();
    };
    DateTime::<Utc>::from_timestamp(t, 0).map_or_else(
        || t.to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// Current Unix time in whole seconds; `0` if the clock is before the epoch.
#[must_use]
pub fn now_unix() -> i64 {
    Utc::now().timestamp().max(0)
}

/// What: Human description of an index refresh timestamp for log lines.
///
/// Output:
/// - `"never"` for `0`, otherwise the UTC date plus the age in hours.
#[must_use]
pub fn describe_refresh(ts: i64, now: i64) -> String {
    if ts <= 0 {
        return "never".to_string();
    }
    let hours = (now - ts).max(0) / 3600;
    format!("{} ({hours}h ago)", ts_to_date(Some(ts)))
}
