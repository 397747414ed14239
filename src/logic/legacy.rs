//! Fallback parser for `apt list --upgradable`.
//!
//! Only used when `apt-get` is unavailable. Lines look like
//! `name/channel [phased NN%]? version]` or, on current apt,
//! `name/channel version arch [upgradable from: old]`. Phasing is read
//! directly from the `[phased` marker; no deferred set is involved.

use crate::state::UpdateRecord;

/// Marker apt puts in front of the installed version.
const UPGRADABLE_FROM: &str = "upgradable from:";

/// What: Parse the whole listing.
///
/// Inputs:
/// - `text`: Output of `apt list --upgradable`.
///
/// Output:
/// - Records in listing order, unique by name.
#[must_use]
pub fn parse_upgradable(text: &str) -> Vec<UpdateRecord> {
    let mut records: Vec<UpdateRecord> = Vec::new();
    for record in text.lines().filter_map(parse_upgradable_line) {
        if !records.iter().any(|r| r.name == record.name) {
            records.push(record);
        }
    }
    records
}

/// What: Parse one listing line.
///
/// Inputs:
/// - `line`: Single line of `apt list --upgradable` output.
///
/// Output:
/// - `Some(UpdateRecord)` for package lines; `None` for warnings, the
///   `Listing...` header, blanks, and anything without a `name/channel` token.
///
/// Details:
/// - The package name is the part of the first token before `/`.
/// - Bracketed groups such as `[phased 10%]` are set aside first; the version is
///   then the last field ending in `]` with the bracket stripped. A lone
///   `name/channel version` pair is also accepted; anything else without a
///   closing `]` is skipped.
/// - With an `[upgradable from: X]` group the version follows the channel and
///   `X` becomes the current version.
#[must_use]
pub fn parse_upgradable_line(line: &str) -> Option<UpdateRecord> {
    let line = line.trim();
    if line.is_empty() || line.to_ascii_lowercase().starts_with("warning:") {
        return None;
    }
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 2 {
        return None;
    }
    let (name, _channel) = parts[0].split_once('/')?;
    if name.is_empty() {
        return None;
    }
    let is_phased = bracket_groups(line).any(|g| g.to_ascii_lowercase().contains("phased"));

    let cleaned = without_groups(line);
    let fields: Vec<&str> = cleaned.split_whitespace().skip(1).collect();

    if let Some(current) = upgradable_from(line) {
        let target = fields.first().filter(|v| !v.contains(']'))?;
        return Some(UpdateRecord::new(name, Some(current), target).phased(is_phased));
    }

    let target = fields
        .iter()
        .rev()
        .find(|p| p.ends_with(']'))
        .map(|p| p.trim_end_matches(']'))
        .or_else(|| match fields.as_slice() {
            [only] if !only.contains(']') => Some(*only),
            _ => None,
        })
        .filter(|v| !v.is_empty())?;

    Some(UpdateRecord::new(name, None, target).phased(is_phased))
}

/// Line with every balanced `[...]` group removed; stray `]` are kept.
fn without_groups(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find(']') else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push(' ');
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

/// Contents of every `[...]` group on the line.
fn bracket_groups(line: &str) -> impl Iterator<Item = &str> {
    line.split('[')
        .skip(1)
        .filter_map(|chunk| chunk.split_once(']').map(|(inside, _)| inside))
}

/// Installed version named by an `[upgradable from: X]` group.
fn upgradable_from(line: &str) -> Option<&str> {
    bracket_groups(line).find_map(|g| {
        let rest = g.trim().strip_prefix(UPGRADABLE_FROM)?;
        let version = rest.split(',').next()?.trim();
        (!version.is_empty()).then_some(version)
    })
}
