//! Check engine: runs the pipeline from simulation to categorized snapshot.

use std::path::PathBuf;
use std::time::Instant;

use super::aggregate::{aggregate, last_index_refresh};
use super::classify::Classifier;
use super::legacy::parse_upgradable;
use super::phasing::resolve_phasing;
use super::simulate::parse_simulation;
use crate::report::CheckResult;
use crate::settings::RuntimeConfig;
use crate::sources::apt::{self, NO_UPGRADES_EXIT_CODE, PhasingMode, UpdateSource};
use crate::sources::runner::{CheckContext, CommandError, CommandOutput, CommandRunner};
use crate::state::{CheckSnapshot, Selector, UpdateRecord, UpdateType};

/// Failure that aborts a whole check.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// Neither `apt-get` nor `apt` is on `PATH`.
    #[error("no supported package manager found (need apt-get or apt)")]
    NoPackageManager,
    /// A listing command could not produce output.
    #[error("{stage} failed: {source}")]
    Command {
        /// Pipeline stage that ran the command.
        stage: &'static str,
        /// Underlying command failure.
        #[source]
        source: CommandError,
    },
    /// The deadline passed or the check was cancelled mid-way.
    #[error("check interrupted before completion")]
    Interrupted,
}

/// Engine settings taken from the runtime configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of policy queries in flight.
    pub policy_concurrency: usize,
    /// Directory whose newest file marks the last index refresh.
    pub lists_dir: PathBuf,
    /// Count above which a single-category result is flagged.
    pub warning_threshold: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&RuntimeConfig::default())
    }
}

impl From<&RuntimeConfig> for EngineConfig {
    fn from(config: &RuntimeConfig) -> Self {
        Self {
            policy_concurrency: config.policy_concurrency,
            lists_dir: config.lists_dir.clone(),
            warning_threshold: config.warning_threshold,
        }
    }
}

/// What: Pending-update checker bound to one runner and listing strategy.
///
/// Details:
/// - Holds no mutable state; independent checks may run concurrently, each
///   spawning its own command chain.
#[derive(Debug)]
pub struct UpdateChecker<R> {
    runner: R,
    config: EngineConfig,
    source: UpdateSource,
}

impl<R: CommandRunner> UpdateChecker<R> {
    /// Checker using an explicit listing strategy.
    pub const fn new(runner: R, config: EngineConfig, source: UpdateSource) -> Self {
        Self {
            runner,
            config,
            source,
        }
    }

    /// What: Checker using the strategy supported by the host.
    ///
    /// # Errors
    /// - Returns `Err(CheckError::NoPackageManager)` when no APT frontend is installed.
    pub fn detect(runner: R, config: EngineConfig) -> Result<Self, CheckError> {
        let source = UpdateSource::detect().ok_or(CheckError::NoPackageManager)?;
        Ok(Self::new(runner, config, source))
    }

    /// Listing strategy in use.
    pub const fn source(&self) -> UpdateSource {
        self.source
    }

    /// Runner that executes this checker's commands.
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// What: Run the full pipeline and categorize every pending upgrade.
    ///
    /// Inputs:
    /// - `ctx`: Deadline and cancellation for every command of this check.
    ///
    /// Output:
    /// - [`CheckSnapshot`] with all five categories and timing metadata.
    ///
    /// # Errors
    /// - Returns `Err(CheckError::Command)` when a listing command fails to run
    ///   or exits non-zero without output.
    /// - Returns `Err(CheckError::Interrupted)` when the context ends mid-check.
    ///
    /// Details:
    /// - Duration is measured from the first command to result assembly.
    /// - Policy query failures only drop the package from security/optional.
    pub async fn check_all(&self, ctx: &CheckContext) -> Result<CheckSnapshot, CheckError> {
        let started = Instant::now();
        let records = self.candidates(true, ctx).await?;

        let classifications = Classifier::new(&self.runner, self.config.policy_concurrency)
            .classify_all(&records, ctx)
            .await;
        if ctx.is_done() {
            return Err(CheckError::Interrupted);
        }
        let categorized = aggregate(&records, &classifications);
        let last_refresh = last_index_refresh(&self.runner, &self.config.lists_dir, ctx).await;

        let snapshot = CheckSnapshot {
            categorized,
            check_duration_seconds: started.elapsed().as_secs_f64(),
            last_index_refresh_unix_time: last_refresh,
        };
        tracing::info!(
            total = snapshot.categorized.all.count(),
            security = snapshot.categorized.security.count(),
            phased = snapshot.categorized.phased.count(),
            failed_queries = classifications.iter().filter(|c| c.verdict.is_err()).count(),
            duration = snapshot.check_duration_seconds,
            "update check finished"
        );
        Ok(snapshot)
    }

    /// What: Run a single-category check.
    ///
    /// Inputs:
    /// - `selector`: Category plus the include-phased flag.
    /// - `ctx`: Deadline and cancellation.
    ///
    /// Output:
    /// - [`CheckResult`] listing the matching records in listing order.
    ///
    /// # Errors
    /// - Same conditions as [`Self::check_all`].
    ///
    /// Details:
    /// - Without the include-phased flag only the phasing-excluded pass runs and
    ///   phased packages never appear.
    /// - With it, phased packages are included whatever the category; they are
    ///   never classified.
    /// - Only `security` and `optional` issue policy queries; `recommended` is
    ///   every non-phased record and `all` is every record.
    pub async fn check(
        &self,
        selector: Selector,
        ctx: &CheckContext,
    ) -> Result<CheckResult, CheckError> {
        let started = Instant::now();
        let records = self.candidates(selector.include_phased, ctx).await?;
        let selected = self.select(records, selector.update_type, ctx).await?;
        let last_refresh = last_index_refresh(&self.runner, &self.config.lists_dir, ctx).await;

        tracing::info!(
            update_type = selector.update_type.as_str(),
            include_phased = selector.include_phased,
            count = selected.len(),
            "category check finished"
        );
        Ok(CheckResult::new(
            selected,
            started.elapsed().as_secs_f64(),
            last_refresh,
            self.config.warning_threshold,
        ))
    }

    /// Keep the records matching `update_type`; phased records always pass.
    async fn select(
        &self,
        records: Vec<UpdateRecord>,
        update_type: UpdateType,
        ctx: &CheckContext,
    ) -> Result<Vec<UpdateRecord>, CheckError> {
        if matches!(update_type, UpdateType::All | UpdateType::Recommended) {
            return Ok(records);
        }
        let classifications = Classifier::new(&self.runner, self.config.policy_concurrency)
            .classify_all(&records, ctx)
            .await;
        if ctx.is_done() {
            return Err(CheckError::Interrupted);
        }
        let categorized = aggregate(&records, &classifications);
        let wanted = categorized.bucket(update_type);
        Ok(records
            .into_iter()
            .filter(|r| r.is_phased || wanted.contains(&r.name))
            .collect())
    }

    /// What: Phase-flagged candidate records from the configured source.
    ///
    /// Details:
    /// - Simulate, with phased: pass A yields the deferred set, pass B the
    ///   records, the resolver flags them.
    /// - Simulate, without phased: pass A's records alone.
    /// - Upgradable: phasing is read off each line; phased records are dropped
    ///   unless requested.
    async fn candidates(
        &self,
        include_phased: bool,
        ctx: &CheckContext,
    ) -> Result<Vec<UpdateRecord>, CheckError> {
        match self.source {
            UpdateSource::Simulate => {
                let pass_a = parse_simulation(&self.simulate(PhasingMode::Exclude, ctx).await?);
                if !include_phased {
                    return Ok(pass_a.records);
                }
                tracing::debug!(deferred = pass_a.deferred.len(), "phasing-excluded pass done");
                let pass_b = parse_simulation(&self.simulate(PhasingMode::Include, ctx).await?);
                Ok(resolve_phasing(pass_b.records, &pass_a.deferred))
            }
            UpdateSource::Upgradable => {
                let out = apt::list_upgradable(&self.runner, ctx)
                    .await
                    .map_err(stage("apt list --upgradable"))?;
                let mut records = parse_upgradable(&listing_text(out, apt::APT)?);
                if !include_phased {
                    records.retain(|r| !r.is_phased);
                }
                Ok(records)
            }
        }
    }

    async fn simulate(&self, mode: PhasingMode, ctx: &CheckContext) -> Result<String, CheckError> {
        let out = apt::simulate_upgrade(&self.runner, mode, ctx)
            .await
            .map_err(stage("apt-get -s upgrade"))?;
        listing_text(out, apt::APT_GET)
    }
}

/// What: Text of a listing command, applying the empty-result rule.
///
/// Details:
/// - Exit 100 with no output means "nothing to upgrade" and yields empty text.
/// - Any other non-zero exit without output is an execution failure.
fn listing_text(out: CommandOutput, program: &'static str) -> Result<String, CheckError> {
    if out.exit_code == Some(NO_UPGRADES_EXIT_CODE) && out.is_empty() {
        tracing::debug!(program, "no upgrades reported");
        return Ok(String::new());
    }
    let out = out.into_checked(program).map_err(stage(program))?;
    Ok(out.text())
}

fn stage(stage: &'static str) -> impl FnOnce(CommandError) -> CheckError {
    move |source| CheckError::Command { stage, source }
}
