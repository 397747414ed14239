//! Integration tests that spawn real processes: deadlines and the index scan.

#![cfg(all(test, unix))]

use std::fs::File;
use std::time::{Duration, Instant};

use aptpulse::logic::{CheckError, EngineConfig, UpdateChecker, last_index_refresh};
use aptpulse::sources::{CheckContext, CommandError, UpdateSource};
use tokio_util::sync::CancellationToken;

use crate::support::{HangingRunner, ScriptedRunner};

#[tokio::test]
/// What: A hanging simulation is killed at the deadline and aborts the check.
///
/// Inputs:
/// - Runner whose commands all sleep for 30 seconds, 300 ms deadline.
///
/// Output:
/// - `CheckError::Command` wrapping `TimedOut`, returned well before the sleep ends.
async fn integration_deadline_kills_simulation() {
    let checker = UpdateChecker::new(HangingRunner, EngineConfig::default(), UpdateSource::Simulate);
    let ctx = CheckContext::with_timeout(Duration::from_millis(300));
    let started = Instant::now();
    let err = checker.check_all(&ctx).await.expect_err("deadline");
    assert!(matches!(
        err,
        CheckError::Command {
            source: CommandError::TimedOut { .. },
            ..
        }
    ));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
/// What: A context cancelled before the first pass fails the listing stage.
///
/// Inputs:
/// - Real process runner, token cancelled before the check starts.
///
/// Output:
/// - `CheckError::Command` wrapping `Cancelled`; no child is spawned.
async fn integration_cancel_before_simulation() {
    let checker = UpdateChecker::new(HangingRunner, EngineConfig::default(), UpdateSource::Simulate);
    let token = CancellationToken::new();
    token.cancel();
    let ctx = CheckContext::new(
        tokio::time::Instant::now() + Duration::from_secs(30),
        token,
    );
    let started = Instant::now();
    let err = checker.check_all(&ctx).await.expect_err("cancelled");
    assert!(matches!(
        err,
        CheckError::Command {
            source: CommandError::Cancelled { .. },
            ..
        }
    ));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
/// What: The newest file under the lists directory is reported, via a real `find`.
async fn integration_index_refresh_from_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    File::create(dir.path().join("archive_Packages")).expect("file");
    std::fs::create_dir(dir.path().join("partial")).expect("subdir");
    File::create(dir.path().join("partial").join("x_InRelease")).expect("file");

    let runner = ScriptedRunner::default().with_real_find();
    let ctx = CheckContext::with_timeout(Duration::from_secs(10));
    let ts = last_index_refresh(&runner, dir.path(), &ctx).await;

    let now = aptpulse::util::now_unix();
    assert!(ts > 0, "timestamp should be set");
    assert!((now - ts).abs() < 300, "fresh files should be recent: {ts} vs {now}");
    assert_eq!(runner.calls_to("find").len(), 1);
}

#[tokio::test]
async fn integration_index_refresh_missing_dir_is_zero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = ScriptedRunner::default().with_real_find();
    let ctx = CheckContext::with_timeout(Duration::from_secs(10));
    assert_eq!(
        last_index_refresh(&runner, &dir.path().join("absent"), &ctx).await,
        0
    );
}
