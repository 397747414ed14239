//! Builds the categorized view of one check.

use std::collections::HashMap;
use std::path::Path;

use super::classify::{Classification, PolicyVerdict};
use crate::sources::apt;
use crate::sources::runner::{CheckContext, CommandRunner};
use crate::state::{CategorizedUpdates, UpdateRecord};

/// What: Sort phase-flagged records into the five category buckets.
///
/// Inputs:
/// - `records`: Phase-flagged candidates, in listing order.
/// - `classifications`: Policy results for the non-phased records.
///
/// Output:
/// - [`CategorizedUpdates`] with every bucket in record order.
///
/// Details:
/// - Every record lands in `all`.
/// - Phased records land in `phased` only; they are never classified.
/// - Every non-phased record lands in `recommended`, including those whose
///   policy query failed.
/// - `security` and `optional` follow a successful verdict; a failed or missing
///   verdict adds neither.
#[must_use]
pub fn aggregate(
    records: &[UpdateRecord],
    classifications: &[Classification],
) -> CategorizedUpdates {
    let verdicts: HashMap<&str, PolicyVerdict> = classifications
        .iter()
        .filter_map(|c| c.ok().map(|v| (c.name.as_str(), v)))
        .collect();

    let mut categorized = CategorizedUpdates::default();
    for record in records {
        categorized.all.push(record);
        if record.is_phased {
            categorized.phased.push(record);
            continue;
        }
        categorized.recommended.push(record);
        let verdict = verdicts
            .get(record.name.as_str())
            .copied()
            .unwrap_or_default();
        if verdict.security {
            categorized.security.push(record);
        }
        if verdict.optional {
            categorized.optional.push(record);
        }
    }
    categorized
}

/// What: Newest timestamp in `find -printf '%T@\n'` output.
///
/// Output:
/// - Whole seconds since the epoch, or `0` when no line parses.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn newest_mtime(text: &str) -> i64 {
    text.lines()
        .filter_map(|l| l.trim().parse::<f64>().ok())
        .filter(|t| t.is_finite() && *t > 0.0)
        .fold(0.0_f64, f64::max)
        .trunc() as i64
}

/// What: Time of the last package-index refresh.
///
/// Inputs:
/// - `runner`: Command runner.
/// - `lists_dir`: Index directory, normally `/var/lib/apt/lists`.
/// - `ctx`: Deadline and cancellation.
///
/// Output:
/// - Newest file modification time under `lists_dir`; `0` when it cannot be determined.
pub async fn last_index_refresh<R: CommandRunner>(
    runner: &R,
    lists_dir: &Path,
    ctx: &CheckContext,
) -> i64 {
    match apt::list_mtimes(runner, lists_dir, ctx).await {
        Ok(out) => {
            let newest = newest_mtime(&out.text());
            if newest == 0 {
                tracing::warn!(dir = %lists_dir.display(), "no index files found");
            }
            newest
        }
        Err(err) => {
            tracing::warn!(dir = %lists_dir.display(), error = %err, "index refresh time unavailable");
            0
        }
    }
}
