//! aptpulse binary entrypoint kept minimal. The engine lives in the library crate.

mod args;

use std::fmt;
use std::path::Path;
use std::process::ExitCode;
use std::sync::OnceLock;

use aptpulse::logic::{EngineConfig, UpdateChecker};
use aptpulse::settings::RuntimeConfig;
use aptpulse::sources::{CheckContext, SystemCommandRunner};
use clap::Parser;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use crate::args::{Args, CliError};

struct AptpulseTimer;

impl tracing_subscriber::fmt::time::FormatTime for AptpulseTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let s = aptpulse::util::ts_to_date(Some(aptpulse::util::now_unix())); // "YYYY-MM-DD HH:MM:SS"
        w.write_str(&s.replacen(' ', "T", 1))
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// What: Install the global tracing subscriber.
///
/// Inputs:
/// - `level`: Default filter when `RUST_LOG` is unset.
/// - `log_file`: Optional file that receives a copy of every log line.
///
/// Details:
/// - Logs always go to stderr so stdout carries nothing but the result.
/// - If the log file cannot be opened, logging continues on stderr alone.
fn init_logging(level: &str, log_file: Option<&Path>) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_timer(AptpulseTimer);

    let opened = log_file.map(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map(|file| (path, file))
    });
    match opened {
        Some(Ok((path, file))) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            builder
                .with_writer(std::io::stderr.and(non_blocking))
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::debug!(path = %path.display(), "file logging initialized");
        }
        Some(Err(e)) => {
            builder.with_writer(std::io::stderr).init();
            tracing::warn!(error = %e, "failed to open log file; using stderr only");
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
}

/// Load settings under a temporary warn-level subscriber so problems in the
/// settings file are reported before the real subscriber exists.
fn load_settings(args: &Args) -> Result<RuntimeConfig, CliError> {
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .finish();
    let mut config = tracing::subscriber::with_default(bootstrap, || {
        RuntimeConfig::load(args.config.as_deref())
    })?;
    args::apply_overrides(args, &mut config);
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let config = match load_settings(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("aptpulse: {err}");
            return err.exit_code();
        }
    };
    init_logging(
        &args::determine_log_level(&args, &config),
        args.log_file.as_deref(),
    );
    tracing::debug!(?config, "configuration loaded");

    let checker = match UpdateChecker::detect(SystemCommandRunner, EngineConfig::from(&config)) {
        Ok(checker) => checker,
        Err(err) => {
            tracing::error!(error = %err, "no package manager");
            return CliError::from(err).exit_code();
        }
    };
    tracing::debug!(source = ?checker.source(), "listing strategy selected");

    let ctx = CheckContext::with_timeout(config.timeout());
    let cancel = ctx.cancellation().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; cancelling check");
            cancel.cancel();
        }
    });

    match args::run_command(&checker, &args.command, args.pretty, &ctx).await {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "check failed");
            eprintln!("aptpulse: {err}");
            err.exit_code()
        }
    }
}
