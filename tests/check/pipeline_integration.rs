//! Integration tests for the full check pipeline.
//!
//! Tests cover:
//! - Two-pass phasing resolution and category buckets
//! - Per-package classification failures
//! - Empty and no-upgrades results
//! - Single-category selection

#![cfg(test)]

use std::time::Duration;

use aptpulse::logic::{CheckError, EngineConfig, UpdateChecker};
use aptpulse::sources::{CheckContext, UpdateSource};
use aptpulse::state::{Selector, UpdateType};

use crate::support::{POLICY_MAIN, POLICY_SECURITY, POLICY_UNIVERSE, ScriptedRunner};

const PASS_A: &str = "\
Reading package lists... Done
Building dependency tree... Done
Reading state information... Done
Calculating upgrade... Done
The following upgrades have been deferred due to phasing:
  libgl1-mesa-dri
The following packages will be upgraded:
  bsdextrautils openssl vim-tiny
3 upgraded, 0 newly installed, 0 to remove and 1 not upgraded.
Inst bsdextrautils [2.35.1-6ubuntu1] (2.39.3-9ubuntu6.3 Ubuntu:24.04/noble-updates [amd64])
Inst openssl [3.0.13-0ubuntu3.4] (3.0.13-0ubuntu3.5 Ubuntu:24.04/noble-security [amd64])
Inst vim-tiny [2:9.1.0016-1ubuntu7.5] (2:9.1.0016-1ubuntu7.6 Ubuntu:24.04/noble-updates [amd64])
Conf bsdextrautils (2.39.3-9ubuntu6.3 Ubuntu:24.04/noble-updates [amd64])
";

const PASS_B: &str = "\
Reading package lists... Done
The following packages will be upgraded:
  bsdextrautils libgl1-mesa-dri openssl vim-tiny
4 upgraded, 0 newly installed, 0 to remove and 0 not upgraded.
Inst bsdextrautils [2.35.1-6ubuntu1] (2.39.3-9ubuntu6.3 Ubuntu:24.04/noble-updates [amd64])
Inst libgl1-mesa-dri [24.0.5-1ubuntu1] (24.0.9-0ubuntu0.1 Ubuntu:24.04/noble-updates [amd64])
Inst openssl [3.0.13-0ubuntu3.4] (3.0.13-0ubuntu3.5 Ubuntu:24.04/noble-security [amd64])
Inst vim-tiny [2:9.1.0016-1ubuntu7.5] (2:9.1.0016-1ubuntu7.6 Ubuntu:24.04/noble-updates [amd64])
";

fn ctx() -> CheckContext {
    CheckContext::with_timeout(Duration::from_secs(10))
}

fn host() -> ScriptedRunner {
    ScriptedRunner::default()
        .passes(PASS_A, PASS_B)
        .policy("bsdextrautils", POLICY_MAIN)
        .policy("openssl", POLICY_SECURITY)
        .policy("vim-tiny", POLICY_UNIVERSE)
}

fn checker(runner: ScriptedRunner) -> UpdateChecker<ScriptedRunner> {
    UpdateChecker::new(runner, EngineConfig::default(), UpdateSource::Simulate)
}

#[tokio::test]
/// What: Full check on a host with one phased package.
///
/// Inputs:
/// - Pass A deferring `libgl1-mesa-dri`, pass B listing it, policy outputs per package.
///
/// Output:
/// - Buckets follow phasing and policy; phased packages get no policy query.
async fn integration_check_all_buckets() {
    let checker = checker(host());
    let snap = checker.check_all(&ctx()).await.expect("check succeeds");
    let c = &snap.categorized;

    assert_eq!(
        c.all.names(),
        ["bsdextrautils", "libgl1-mesa-dri", "openssl", "vim-tiny"]
    );
    assert_eq!(c.phased.names(), ["libgl1-mesa-dri"]);
    assert_eq!(c.security.names(), ["openssl"]);
    assert_eq!(c.optional.names(), ["vim-tiny"]);
    assert_eq!(c.recommended.names(), ["bsdextrautils", "openssl", "vim-tiny"]);

    for bucket in [&c.all, &c.security, &c.recommended, &c.optional, &c.phased] {
        assert_eq!(bucket.count(), bucket.details().len());
        assert_eq!(bucket.count(), bucket.names().len());
    }
    for record in c.all.details() {
        assert!(!record.target_version.contains('[') && !record.target_version.contains(']'));
        assert_eq!(record.is_phased, c.phased.contains(&record.name));
    }
    let phased = &c.phased.details()[0];
    assert_eq!(phased.current_version.as_deref(), Some("24.0.5-1ubuntu1"));
    assert_eq!(phased.target_version, "24.0.9-0ubuntu0.1");

    let policy_calls = checker_policy_calls(&checker);
    assert_eq!(policy_calls, ["bsdextrautils", "openssl", "vim-tiny"]);
}

fn checker_policy_calls(checker: &UpdateChecker<ScriptedRunner>) -> Vec<String> {
    checker
        .runner()
        .calls_to("apt-cache")
        .into_iter()
        .map(|args| args[1].clone())
        .collect()
}

#[tokio::test]
/// What: A failing policy query only removes that package from security/optional.
async fn integration_policy_failure_is_isolated() {
    let runner = ScriptedRunner::default()
        .passes(PASS_A, PASS_B)
        .policy("bsdextrautils", POLICY_MAIN)
        .respond("apt-cache", &["policy", "openssl"], "", 1)
        .policy("vim-tiny", POLICY_UNIVERSE);
    let snap = checker(runner).check_all(&ctx()).await.expect("check succeeds");
    let c = &snap.categorized;
    assert_eq!(c.all.count(), 4);
    assert!(c.recommended.contains("openssl"));
    assert!(!c.security.contains("openssl"));
    assert_eq!(c.optional.names(), ["vim-tiny"]);
}

#[tokio::test]
async fn integration_empty_output_is_zero_snapshot() {
    let runner = ScriptedRunner::default().passes("", "");
    let snap = checker(runner).check_all(&ctx()).await.expect("empty is ok");
    assert_eq!(snap.categorized.all.count(), 0);
    assert!(snap.categorized.all.details().is_empty());
}

#[tokio::test]
/// What: Exit code 100 without output is the recognised "nothing to do" result.
async fn integration_no_upgrades_exit_code() {
    let runner = ScriptedRunner::default()
        .respond(
            "env",
            &aptpulse::sources::apt::simulate_args(aptpulse::sources::PhasingMode::Exclude),
            "",
            100,
        );
    let result = checker(runner)
        .check(Selector::default(), &ctx())
        .await
        .expect("zero-count success");
    assert_eq!(result.available_updates, 0);
    assert!(result.package_details_list.is_empty());
}

#[tokio::test]
async fn integration_missing_apt_get_is_execution_failure() {
    let err = checker(ScriptedRunner::default())
        .check_all(&ctx())
        .await
        .expect_err("spawn failure aborts");
    assert!(matches!(err, CheckError::Command { .. }));
}

#[tokio::test]
/// What: Single-category selection with and without phased packages.
async fn integration_selector_views() {
    let checker = checker(host());

    let security = checker
        .check(Selector::from_params(&["security"]), &ctx())
        .await
        .expect("security");
    assert_eq!(security.names(), ["openssl"]);

    let recommended = checker
        .check(Selector::from_params(&["recommended"]), &ctx())
        .await
        .expect("recommended");
    assert_eq!(recommended.available_updates, 3);

    let all_phased = checker
        .check(Selector::from_params(&["all", "include-phased"]), &ctx())
        .await
        .expect("all with phased");
    assert_eq!(all_phased.available_updates, 4);
    assert!(
        all_phased
            .package_details_list
            .iter()
            .any(|r| r.name == "libgl1-mesa-dri" && r.is_phased)
    );

    let selector = Selector::from_params(&["Security"]);
    assert_eq!(selector.update_type, UpdateType::All);
}
