//! Caller-facing JSON result shapes.
//!
//! Field names are part of the monitoring contract and must not change.
//! List and detail arrays are omitted when empty; counts are always present.

use serde::Serialize;

use crate::state::{CategoryBucket, CheckSnapshot, UpdateRecord};

/// Result of a single-category check (`count`, `list` and `details` surfaces).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CheckResult {
    /// Number of matching upgrades.
    pub available_updates: usize,
    /// Matching upgrades in listing order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub package_details_list: Vec<UpdateRecord>,
    /// Wall-clock duration of the check.
    pub check_duration_seconds: f64,
    /// Last package-index refresh, unix seconds; `0` when unknown.
    pub last_apt_update_time: i64,
    /// Configured warning threshold.
    pub warning_threshold: u32,
    /// Whether `available_updates` exceeds the threshold.
    pub is_above_warning: bool,
}

impl CheckResult {
    /// What: Assemble a result from the selected records.
    ///
    /// Inputs:
    /// - `records`: Selected upgrades.
    /// - `check_duration_seconds`: Elapsed check time.
    /// - `last_apt_update_time`: Index refresh time.
    /// - `warning_threshold`: Count above which the result is flagged.
    ///
    /// Output:
    /// - A [`CheckResult`] with `available_updates == package_details_list.len()`.
    #[must_use]
    pub fn new(
        records: Vec<UpdateRecord>,
        check_duration_seconds: f64,
        last_apt_update_time: i64,
        warning_threshold: u32,
    ) -> Self {
        let available_updates = records.len();
        let threshold = usize::try_from(warning_threshold).unwrap_or(usize::MAX);
        Self {
            available_updates,
            package_details_list: records,
            check_duration_seconds,
            last_apt_update_time,
            warning_threshold,
            is_above_warning: available_updates > threshold,
        }
    }

    /// Names of the listed packages in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.package_details_list
            .iter()
            .map(|r| r.name.as_str())
            .collect()
    }
}

/// Result of the comprehensive check across every category.
///
/// Each category contributes `<category>_updates_count`, `_list` and `_details`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AllUpdatesResult {
    /// Non-phased upgrades from a security pocket.
    pub security_updates_count: usize,
    /// Every non-phased upgrade.
    pub recommended_updates_count: usize,
    /// Non-phased upgrades from universe/multiverse.
    pub optional_updates_count: usize,
    /// Every pending upgrade, phased included.
    pub all_updates_count: usize,
    /// Upgrades held back by a phased rollout.
    pub phased_updates_count: usize,

    /// Names of phased upgrades.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub phased_updates_list: Vec<String>,
    /// Records of phased upgrades.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub phased_updates_details: Vec<UpdateRecord>,

    /// Names of security upgrades.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_updates_list: Vec<String>,
    /// Names of recommended upgrades.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recommended_updates_list: Vec<String>,
    /// Names of optional upgrades.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub optional_updates_list: Vec<String>,
    /// Names of every pending upgrade.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_updates_list: Vec<String>,

    /// Records of security upgrades.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_updates_details: Vec<UpdateRecord>,
    /// Records of recommended upgrades.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recommended_updates_details: Vec<UpdateRecord>,
    /// Records of optional upgrades.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub optional_updates_details: Vec<UpdateRecord>,
    /// Records of every pending upgrade.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_updates_details: Vec<UpdateRecord>,

    /// Wall-clock duration of the check.
    pub check_duration_seconds: f64,
    /// Last package-index refresh, unix seconds; `0` when unknown.
    pub last_apt_update_time: i64,
}

fn split(bucket: &CategoryBucket) -> (usize, Vec<String>, Vec<UpdateRecord>) {
    (
        bucket.count(),
        bucket.names().to_vec(),
        bucket.details().to_vec(),
    )
}

impl From<&CheckSnapshot> for AllUpdatesResult {
    fn from(snapshot: &CheckSnapshot) -> Self {
        let c = &snapshot.categorized;
        let (security_updates_count, security_updates_list, security_updates_details) =
            split(&c.security);
        let (recommended_updates_count, recommended_updates_list, recommended_updates_details) =
            split(&c.recommended);
        let (optional_updates_count, optional_updates_list, optional_updates_details) =
            split(&c.optional);
        let (all_updates_count, all_updates_list, all_updates_details) = split(&c.all);
        let (phased_updates_count, phased_updates_list, phased_updates_details) = split(&c.phased);

        Self {
            security_updates_count,
            recommended_updates_count,
            optional_updates_count,
            all_updates_count,
            phased_updates_count,
            phased_updates_list,
            phased_updates_details,
            security_updates_list,
            recommended_updates_list,
            optional_updates_list,
            all_updates_list,
            security_updates_details,
            recommended_updates_details,
            optional_updates_details,
            all_updates_details,
            check_duration_seconds: snapshot.check_duration_seconds,
            last_apt_update_time: snapshot.last_index_refresh_unix_time,
        }
    }
}
