//! Reconciles the two simulation passes into phase-flagged records.

use crate::state::{DeferredSet, UpdateRecord};

/// What: Flag the records of the phasing-included pass.
///
/// Inputs:
/// - `records`: Candidates from the pass run with phased updates included.
/// - `deferred`: Names deferred by the pass run with phased updates excluded.
///
/// Output:
/// - The same records in the same order, `is_phased` set exactly for names in `deferred`.
///
/// Details:
/// - Precondition: both passes come from the same host state within one check.
///   A deferred set from an unrelated run is not detected and yields wrong flags.
/// - Deferred names with no matching record are ignored.
#[must_use]
pub fn resolve_phasing(records: Vec<UpdateRecord>, deferred: &DeferredSet) -> Vec<UpdateRecord> {
    records
        .into_iter()
        .map(|record| {
            let is_phased = deferred.contains(&record.name);
            record.phased(is_phased)
        })
        .collect()
}
