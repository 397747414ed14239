//! Shared utilities for argument processing.

use aptpulse::settings::{MIN_TIMEOUT_SECS, RuntimeConfig};

use super::Args;

/// What: Determine the log level based on command-line arguments and settings.
///
/// Inputs:
/// - `args`: Parsed command-line arguments.
/// - `config`: Loaded runtime configuration.
///
/// Output:
/// - Log level string (trace, debug, info, warn, error).
///
/// Details:
/// - Verbose flag overrides `--log-level`, which overrides `debug_logging`.
/// - Without any of them only warnings are shown.
pub fn determine_log_level(args: &Args, config: &RuntimeConfig) -> String {
    if args.verbose {
        "debug".to_string()
    } else if let Some(level) = &args.log_level {
        level.clone()
    } else if config.debug_logging {
        "debug".to_string()
    } else {
        "warn".to_string()
    }
}

/// What: Apply command-line overrides on top of the loaded configuration.
///
/// Details:
/// - `--timeout` wins over every other source but still respects the minimum.
pub fn apply_overrides(args: &Args, config: &mut RuntimeConfig) {
    if let Some(secs) = args.timeout {
        if secs < MIN_TIMEOUT_SECS {
            tracing::warn!(secs, min = MIN_TIMEOUT_SECS, "timeout raised to minimum");
        }
        config.timeout_secs = secs.max(MIN_TIMEOUT_SECS);
    }
}
