//! Invocations of the APT tool family.
//!
//! Every query here is read-only: upgrade simulation, `apt-cache policy`,
//! the legacy `apt list --upgradable`, and a `find` over the index directory.

use std::path::Path;

use super::runner::{CheckContext, CommandError, CommandOutput, CommandRunner};

/// Wrapper used to pin the locale so message text stays parseable.
const ENV: &str = "env";
/// Locale assignments passed through `env`.
const C_LOCALE: [&str; 2] = ["LC_ALL=C", "LANG=C"];
/// Binary used for upgrade simulation.
pub const APT_GET: &str = "apt-get";
/// Binary used for policy queries.
pub const APT_CACHE: &str = "apt-cache";
/// High-level frontend, only used for the legacy listing.
pub const APT: &str = "apt";
/// Exit status apt uses when the listing had nothing to report.
pub const NO_UPGRADES_EXIT_CODE: i32 = 100;

/// Phasing override passed to a simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhasingMode {
    /// Phased updates are held back and named in the deferral section.
    Exclude,
    /// Phased updates are listed as ordinary candidates.
    Include,
}

impl PhasingMode {
    /// Inline `-o` option value for this mode.
    #[must_use]
    pub const fn option(self) -> &'static str {
        match self {
            Self::Exclude => "APT::Get::Always-Include-Phased-Updates=false",
            Self::Include => "APT::Get::Always-Include-Phased-Updates=true",
        }
    }
}

/// What: Argument vector for `env LC_ALL=C LANG=C apt-get -s -o <phasing> upgrade`.
///
/// Inputs:
/// - `mode`: Phasing override.
///
/// Output:
/// - Arguments to pass after the `env` program name.
#[must_use]
pub fn simulate_args(mode: PhasingMode) -> Vec<&'static str> {
    let mut args = C_LOCALE.to_vec();
    args.extend([APT_GET, "-s", "-o", mode.option(), "upgrade"]);
    args
}

/// What: Run an upgrade simulation.
///
/// Inputs:
/// - `runner`: Command runner.
/// - `mode`: Phasing override for this pass.
/// - `ctx`: Deadline and cancellation.
///
/// Output:
/// - Raw output of the simulation.
///
/// # Errors
/// - Returns `Err` when `apt-get` cannot run or exits non-zero without output.
pub async fn simulate_upgrade<R: CommandRunner>(
    runner: &R,
    mode: PhasingMode,
    ctx: &CheckContext,
) -> Result<CommandOutput, CommandError> {
    let args = simulate_args(mode);
    runner.run(ENV, &args, ctx).await
}

/// Argument vector for `env LC_ALL=C LANG=C apt list --upgradable`.
#[must_use]
pub fn upgradable_args() -> Vec<&'static str> {
    let mut args = C_LOCALE.to_vec();
    args.extend([APT, "list", "--upgradable"]);
    args
}

/// What: Run the legacy upgradable listing.
///
/// # Errors
/// - Returns `Err` when `apt` cannot run.
pub async fn list_upgradable<R: CommandRunner>(
    runner: &R,
    ctx: &CheckContext,
) -> Result<CommandOutput, CommandError> {
    let args = upgradable_args();
    runner.run(ENV, &args, ctx).await
}

/// What: Query `apt-cache policy <name>` for one package.
///
/// # Errors
/// - Returns `Err` when `apt-cache` cannot run or fails silently.
pub async fn policy<R: CommandRunner>(
    runner: &R,
    name: &str,
    ctx: &CheckContext,
) -> Result<CommandOutput, CommandError> {
    runner
        .run(APT_CACHE, &["policy", name], ctx)
        .await?
        .into_checked(APT_CACHE)
}

/// What: List modification times (seconds since epoch) of every file under `dir`.
///
/// Details:
/// - `find` exits 1 when some subdirectory (e.g. `partial/`) is unreadable but
///   still prints the accessible files, so the exit status is not inspected here.
///
/// # Errors
/// - Returns `Err` when `find` cannot run.
pub async fn list_mtimes<R: CommandRunner>(
    runner: &R,
    dir: &Path,
    ctx: &CheckContext,
) -> Result<CommandOutput, CommandError> {
    let dir = dir.to_string_lossy();
    runner
        .run("find", &[&*dir, "-type", "f", "-printf", "%T@\n"], ctx)
        .await
}

/// Which listing strategy the host supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateSource {
    /// Two-pass `apt-get -s upgrade`; phasing aware.
    Simulate,
    /// `apt list --upgradable`; used only when `apt-get` is missing.
    Upgradable,
}

impl UpdateSource {
    /// What: Pick the listing strategy from the binaries on `PATH`.
    ///
    /// Output:
    /// - `Some(Simulate)` when `apt-get` exists, `Some(Upgradable)` when only `apt`
    ///   exists, `None` when neither does.
    #[must_use]
    pub fn detect() -> Option<Self> {
        if which::which(APT_GET).is_ok() {
            Some(Self::Simulate)
        } else if which::which(APT).is_ok() {
            tracing::info!("apt-get not found; falling back to apt list --upgradable");
            Some(Self::Upgradable)
        } else {
            None
        }
    }
}
