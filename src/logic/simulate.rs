//! Parser for `apt-get -s upgrade` output.
//!
//! Candidate lines look like `Inst <name> [<current>] (<target> <origin> [<arch>])`;
//! the bracketed current version is optional. Everything else in the output
//! (progress text, package blocks, summaries) is skipped silently.

use crate::state::{DeferredSet, UpdateRecord};

/// Phrase that opens the block of packages held back by phasing.
const DEFERRED_HEADER: &str = "deferred due to phasing:";
/// Summary counters apt prints after the package blocks.
const SUMMARY_KINDS: [&str; 3] = ["upgraded", "newly installed", "to remove"];

/// Records and deferral block parsed from one simulation run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimulationOutput {
    /// Candidate upgrades in output order, unique by name.
    pub records: Vec<UpdateRecord>,
    /// Names listed under the "deferred due to phasing" header.
    pub deferred: DeferredSet,
}

/// What: Parse the full text of an upgrade simulation.
///
/// Inputs:
/// - `text`: Output of `apt-get -s upgrade` run under the C locale.
///
/// Output:
/// - [`SimulationOutput`] with candidate records and the deferred set.
///
/// Details:
/// - Records keep the order of their `Inst` lines; a repeated name keeps the first.
/// - Unrecognised lines are ignored, so empty output yields an empty result.
#[must_use]
pub fn parse_simulation(text: &str) -> SimulationOutput {
    let mut records: Vec<UpdateRecord> = Vec::new();
    for record in text.lines().filter_map(parse_inst_line) {
        if records.iter().any(|r| r.name == record.name) {
            tracing::debug!(name = %record.name, "duplicate Inst line ignored");
            continue;
        }
        records.push(record);
    }
    SimulationOutput {
        records,
        deferred: parse_deferred(text),
    }
}

/// What: Parse a single `Inst` line.
///
/// Inputs:
/// - `line`: One line of simulation output.
///
/// Output:
/// - `Some(UpdateRecord)` when the line matches the candidate grammar, `None` otherwise.
///
/// Details:
/// - The target version is the first token inside the parentheses, delimited by
///   whitespace or `)`.
#[must_use]
pub fn parse_inst_line(line: &str) -> Option<UpdateRecord> {
    let rest = line.trim().strip_prefix("Inst")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let (name, rest) = next_token(rest)?;

    let rest = rest.trim_start();
    let (current, rest) = match rest.strip_prefix('[') {
        Some(inner) => {
            let end = inner.find(']')?;
            (Some(&inner[..end]), &inner[end + 1..])
        }
        None => (None, rest),
    };

    let inner = rest.trim_start().strip_prefix('(')?;
    let target = inner
        .split(|c: char| c.is_whitespace() || c == ')')
        .next()
        .filter(|t| !t.is_empty())?;

    Some(UpdateRecord::new(name, current.map(str::trim), target))
}

/// Split the first whitespace-delimited token off `s`.
fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

/// What: Collect the names listed under the phasing deferral header.
///
/// Inputs:
/// - `text`: Simulation output.
///
/// Output:
/// - Every token of the non-empty lines following the header.
///
/// Details:
/// - Summary lines (`N upgraded`, `N newly installed`, `N to remove`) are skipped.
/// - Collection stops at the first `N upgraded` line or at the next section
///   header (a line ending in `:`).
#[must_use]
pub fn parse_deferred(text: &str) -> DeferredSet {
    let mut deferred = DeferredSet::default();
    let mut in_section = false;

    for line in text.lines().map(str::trim) {
        if line.contains(DEFERRED_HEADER) {
            in_section = true;
            continue;
        }
        if !in_section || line.is_empty() {
            continue;
        }
        if counted_summary(line) == Some("upgraded") || line.ends_with(':') {
            break;
        }
        if counted_summary(line).is_some() {
            continue;
        }
        for name in line.split_whitespace() {
            deferred.insert(name);
        }
    }
    deferred
}

/// What: Recognise `<digits> <kind>` summary lines.
///
/// Output:
/// - The matched kind (`"upgraded"`, `"newly installed"`, `"to remove"`), if any.
fn counted_summary(line: &str) -> Option<&'static str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix(' ')?;
    SUMMARY_KINDS
        .into_iter()
        .find(|kind| rest.starts_with(kind))
}
