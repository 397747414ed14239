//! Core value types produced and consumed by the update-check pipeline.

use serde::Serialize;
use std::collections::BTreeSet;

/// One pending upgrade as reported by the package manager.
///
/// `target_version` never contains `[` or `]`; parsers strip those simulation
/// delimiters before constructing a record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UpdateRecord {
    /// Package name, unique within one parsed run.
    pub name: String,
    /// Installed version when the output names it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_version: Option<String>,
    /// Candidate version the upgrade would install.
    pub target_version: String,
    /// Whether the upgrade is held back by a phased rollout.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_phased: bool,
}

impl UpdateRecord {
    /// What: Build a record while enforcing the bracket-free version invariant.
    ///
    /// Inputs:
    /// - `name`: Package name.
    /// - `current_version`: Installed version, if known.
    /// - `target_version`: Candidate version; surrounding brackets are stripped.
    ///
    /// Output:
    /// - A non-phased [`UpdateRecord`].
    pub fn new(name: &str, current_version: Option<&str>, target_version: &str) -> Self {
        Self {
            name: name.to_string(),
            current_version: current_version
                .map(strip_brackets)
                .filter(|v| !v.is_empty()),
            target_version: strip_brackets(target_version),
            is_phased: false,
        }
    }

    /// Builder-style setter for the phasing flag.
    #[must_use]
    pub const fn phased(mut self, is_phased: bool) -> Self {
        self.is_phased = is_phased;
        self
    }
}

/// Remove every `[` and `]` from a version token and trim whitespace.
fn strip_brackets(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '[' && *c != ']')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Package names listed under the "deferred due to phasing" section of one
/// simulation run.
///
/// Only meaningful together with the records of the same logical check.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeferredSet {
    names: BTreeSet<String>,
}

impl DeferredSet {
    /// Record a deferred package name.
    pub fn insert(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }

    /// Whether `name` was deferred.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of deferred names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no package was deferred.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Deferred names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for DeferredSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }
}

/// Update category a caller can ask for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    /// Every pending upgrade.
    #[default]
    All,
    /// Upgrades whose candidate comes from a security pocket.
    Security,
    /// Every non-phased upgrade.
    Recommended,
    /// Upgrades from non-main components (universe/multiverse).
    Optional,
}

impl UpdateType {
    /// What: Map a selector token to an update type.
    ///
    /// Inputs:
    /// - `token`: Raw selector text; matched case-sensitively after trimming.
    ///
    /// Output:
    /// - `Some(UpdateType)` for `all`, `security`, `recommended`, `optional`; `None` otherwise.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "all" => Some(Self::All),
            "security" => Some(Self::Security),
            "recommended" => Some(Self::Recommended),
            "optional" => Some(Self::Optional),
            _ => None,
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Security => "security",
            Self::Recommended => "recommended",
            Self::Optional => "optional",
        }
    }
}

/// Tokens that switch phased upgrades into a single-category result.
const PHASED_FLAG_TOKENS: [&str; 2] = ["include-phased", "phased"];

/// Category selection supplied by the monitoring caller as free-form extra
/// parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selector {
    /// Requested category.
    pub update_type: UpdateType,
    /// Whether phased upgrades count towards the result.
    pub include_phased: bool,
}

impl Selector {
    /// What: Interpret the caller's extra parameters.
    ///
    /// Inputs:
    /// - `params`: Free-form tokens, e.g. `["security", "include-phased"]`.
    ///
    /// Output:
    /// - The parsed [`Selector`].
    ///
    /// Details:
    /// - Only the first token selects the category; unknown or missing means `all`.
    /// - Any token equal to `include-phased` or `phased` sets the flag.
    /// - Matching is case-sensitive.
    pub fn from_params<S: AsRef<str>>(params: &[S]) -> Self {
        let update_type = params
            .first()
            .and_then(|p| UpdateType::from_token(p.as_ref()))
            .unwrap_or_default();
        let include_phased = params
            .iter()
            .any(|p| PHASED_FLAG_TOKENS.contains(&p.as_ref().trim()));
        Self {
            update_type,
            include_phased,
        }
    }
}

/// Count, names and details for one update category.
///
/// `count == names.len() == details.len()` holds because [`CategoryBucket::push`]
/// is the only way to grow a bucket.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryBucket {
    count: usize,
    names: Vec<String>,
    details: Vec<UpdateRecord>,
}

impl CategoryBucket {
    /// Append a record, keeping encounter order.
    pub fn push(&mut self, record: &UpdateRecord) {
        self.count += 1;
        self.names.push(record.name.clone());
        self.details.push(record.clone());
    }

    /// Number of records in the bucket.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Package names in encounter order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Records in encounter order.
    #[must_use]
    pub fn details(&self) -> &[UpdateRecord] {
        &self.details
    }

    /// Whether `name` is in the bucket.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// All buckets produced by one check.
///
/// `security`, `optional` and `recommended` may overlap; `phased` is disjoint
/// from the other three and a subset of `all`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategorizedUpdates {
    /// Every pending upgrade, phased included.
    pub all: CategoryBucket,
    /// Non-phased upgrades from a security pocket.
    pub security: CategoryBucket,
    /// Every non-phased upgrade.
    pub recommended: CategoryBucket,
    /// Non-phased upgrades from universe/multiverse.
    pub optional: CategoryBucket,
    /// Upgrades deferred by phasing.
    pub phased: CategoryBucket,
}

impl CategorizedUpdates {
    /// Bucket matching a single-category request.
    #[must_use]
    pub const fn bucket(&self, update_type: UpdateType) -> &CategoryBucket {
        match update_type {
            UpdateType::All => &self.all,
            UpdateType::Security => &self.security,
            UpdateType::Recommended => &self.recommended,
            UpdateType::Optional => &self.optional,
        }
    }
}

/// Result of one full check. Created fresh per request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckSnapshot {
    /// Categorised upgrades.
    pub categorized: CategorizedUpdates,
    /// Wall-clock time from the first command to result assembly.
    pub check_duration_seconds: f64,
    /// Newest modification time under the package index directory, `0` if unknown.
    pub last_index_refresh_unix_time: i64,
}
