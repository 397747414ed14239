//! Runs the requested report and renders it as JSON.

use std::process::ExitCode;

use aptpulse::logic::{CheckError, UpdateChecker};
use aptpulse::report::AllUpdatesResult;
use aptpulse::settings::SettingsError;
use aptpulse::sources::{CheckContext, CommandRunner};
use aptpulse::state::Selector;
use aptpulse::util::{describe_refresh, now_unix};
use serde::Serialize;

use super::Command;

/// Failure surfaced by the binary, mapped onto its exit status.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Settings could not be loaded.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The check itself failed.
    #[error(transparent)]
    Check(#[from] CheckError),
    /// The result could not be rendered.
    #[error("failed to serialise result: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CliError {
    /// Exit status: 1 for configuration, 2 for check failures, 3 for serialisation.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Settings(_) => ExitCode::from(1),
            Self::Check(_) => ExitCode::from(2),
            Self::Serialize(_) => ExitCode::from(3),
        }
    }
}

/// What: Run one report surface.
///
/// Inputs:
/// - `checker`: Engine bound to the host's package manager.
/// - `command`: Requested surface.
/// - `pretty`: Pretty-print JSON.
/// - `ctx`: Deadline and cancellation.
///
/// Output:
/// - Text to print on stdout.
///
/// # Errors
/// - Returns `Err(CliError::Check)` when the check fails.
/// - Returns `Err(CliError::Serialize)` when rendering fails.
pub async fn run_command<R: CommandRunner>(
    checker: &UpdateChecker<R>,
    command: &Command,
    pretty: bool,
    ctx: &CheckContext,
) -> Result<String, CliError> {
    match command {
        Command::All => {
            let snapshot = checker.check_all(ctx).await?;
            tracing::info!(
                last_refresh = %describe_refresh(snapshot.last_index_refresh_unix_time, now_unix()),
                "package index age"
            );
            render(&AllUpdatesResult::from(&snapshot), pretty)
        }
        Command::Count { params } => {
            let result = checker.check(Selector::from_params(params), ctx).await?;
            Ok(result.available_updates.to_string())
        }
        Command::List { params } => {
            let result = checker.check(Selector::from_params(params), ctx).await?;
            render(&result.names(), pretty)
        }
        Command::Details { params } => {
            let result = checker.check(Selector::from_params(params), ctx).await?;
            render(&result, pretty)
        }
    }
}

fn render<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}
