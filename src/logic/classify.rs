//! Per-package classification through `apt-cache policy`.
//!
//! One policy query is issued per non-phased candidate. This is the scaling
//! bottleneck of a check: latency grows linearly with pending upgrades unless
//! `policy_concurrency` allows bounded fan-out.

use futures::stream::{self, StreamExt};

use crate::sources::apt;
use crate::sources::runner::{CheckContext, CommandError, CommandRunner};
use crate::state::UpdateRecord;

/// Fragments naming a security host or pocket.
const SECURITY_MARKERS: [&str; 3] = ["security.", "-security", "Debian-Security"];
/// Non-main components.
const OPTIONAL_MARKERS: [&str; 2] = ["universe", "multiverse"];

/// Category flags derived from one policy query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PolicyVerdict {
    /// Candidate originates from a security pocket or host.
    pub security: bool,
    /// Candidate originates from a non-main component.
    pub optional: bool,
}

/// Outcome of classifying one package; failures stay attached to their package.
#[derive(Debug)]
pub struct Classification {
    /// Package the query was issued for.
    pub name: String,
    /// Verdict, or the error of this package's query.
    pub verdict: Result<PolicyVerdict, CommandError>,
}

impl Classification {
    /// Verdict when the query succeeded.
    #[must_use]
    pub fn ok(&self) -> Option<PolicyVerdict> {
        self.verdict.as_ref().ok().copied()
    }
}

/// What: Derive category flags from `apt-cache policy` text.
///
/// Inputs:
/// - `text`: Policy output for a single package.
///
/// Output:
/// - [`PolicyVerdict`] with security/optional flags.
///
/// Details:
/// - The whole output is searched, so origins listed under any version
///   table entry count.
/// - Security markers: a `security.` host, a `-security` pocket, `Debian-Security`.
/// - Optional markers: `universe`, `multiverse`.
#[must_use]
pub fn classify_policy(text: &str) -> PolicyVerdict {
    PolicyVerdict {
        security: SECURITY_MARKERS.iter().any(|m| text.contains(m)),
        optional: OPTIONAL_MARKERS.iter().any(|m| text.contains(m)),
    }
}

/// Issues policy queries for a batch of candidates.
#[derive(Debug)]
pub struct Classifier<'a, R> {
    /// Runner used for `apt-cache policy`.
    runner: &'a R,
    /// Maximum number of queries in flight.
    concurrency: usize,
}

impl<'a, R: CommandRunner> Classifier<'a, R> {
    /// Classifier issuing at most `concurrency` queries at once (minimum 1).
    pub fn new(runner: &'a R, concurrency: usize) -> Self {
        Self {
            runner,
            concurrency: concurrency.max(1),
        }
    }

    /// What: Classify one package.
    ///
    /// # Errors
    /// - Returns `Err` when the policy query fails.
    pub async fn classify(
        &self,
        name: &str,
        ctx: &CheckContext,
    ) -> Result<PolicyVerdict, CommandError> {
        let output = apt::policy(self.runner, name, ctx).await?;
        Ok(classify_policy(&output.text()))
    }

    /// What: Classify every non-phased record.
    ///
    /// Inputs:
    /// - `records`: Phase-flagged candidates.
    /// - `ctx`: Deadline and cancellation.
    ///
    /// Output:
    /// - One [`Classification`] per non-phased record, in record order.
    ///
    /// Details:
    /// - Phased records are skipped without a query.
    /// - A failed query is logged with its package name and kept in the result;
    ///   it never aborts the batch.
    pub async fn classify_all(
        &self,
        records: &[UpdateRecord],
        ctx: &CheckContext,
    ) -> Vec<Classification> {
        stream::iter(records.iter().filter(|r| !r.is_phased))
            .map(|record| async move {
                let verdict = self.classify(&record.name, ctx).await;
                if let Err(err) = &verdict {
                    tracing::warn!(package = %record.name, error = %err, "policy query failed");
                }
                Classification {
                    name: record.name.clone(),
                    verdict,
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}
