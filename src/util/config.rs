//! Configuration file parsing utilities.
//!
//! This module provides helpers for parsing configuration files with common
//! patterns like comment skipping and key-value parsing.

/// What: Check if a line should be skipped (empty or comment).
///
/// Inputs:
/// - `line`: Line to check
///
/// Output:
/// - `true` if the line should be skipped, `false` otherwise
///
/// Details:
/// - Skips empty lines and lines starting with `#`, `//`, or `;`
#[must_use]
pub fn skip_comment_or_empty(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("//")
        || trimmed.starts_with(';')
}

/// What: Parse a key-value pair from a line.
///
/// Inputs:
/// - `line`: Line containing key=value format
///
/// Output:
/// - `Some((key, value))` if parsing succeeds, `None` otherwise
///
/// Details:
/// - Splits on the first `=` character
/// - Keys are lowercased with `.`, `-` and spaces folded to `_`
/// - Trailing inline comments are removed from the value
#[must_use]
pub fn parse_key_value(line: &str) -> Option<(String, String)> {
    let (raw_key, raw_value) = line.trim().split_once('=')?;
    let key = normalize_key(raw_key);
    if key.is_empty() {
        return None;
    }
    Some((key, strip_inline_comment(raw_value).to_string()))
}

/// Lowercase a key and fold `.`, `-` and spaces to `_`.
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase().replace(['.', '-', ' '], "_")
}

/// What: Remove a trailing `//` or `#` comment from a value.
///
/// Details:
/// - A marker only starts a comment when whitespace precedes it, so values
///   such as `a#b` or `/srv//apt/lists` survive.
#[must_use]
pub fn strip_inline_comment(s: &str) -> &str {
    let s = s.trim();
    let cut = s
        .char_indices()
        .filter(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .find(|&next| s[next..].starts_with('#') || s[next..].starts_with("//"))
        .unwrap_or(s.len());
    s[..cut].trim()
}

/// What: Parse a boolean setting.
///
/// Output:
/// - `Some(true)` for `true`/`1`/`yes`/`on`, `Some(false)` for
///   `false`/`0`/`no`/`off` (case-insensitive), `None` otherwise.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
