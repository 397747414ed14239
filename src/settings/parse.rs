use std::path::PathBuf;

use super::{MAX_POLICY_CONCURRENCY, MIN_TIMEOUT_SECS, RuntimeConfig, SettingsError};
use crate::util::config::{parse_bool, parse_key_value, skip_comment_or_empty};

/// Environment variables and the settings key each one overrides.
pub const ENV_KEYS: [(&str, &str); 5] = [
    ("APTPULSE_DEBUG", "debug_logging"),
    ("APTPULSE_WARNING_THRESHOLD", "warning_threshold"),
    ("APTPULSE_TIMEOUT", "timeout"),
    ("APTPULSE_POLICY_CONCURRENCY", "policy_concurrency"),
    ("APTPULSE_LISTS_DIR", "lists_dir"),
];

/// What: Apply one `key = value` setting.
///
/// Inputs:
/// - `config`: Configuration to update.
/// - `key`: Normalised key.
/// - `value`: Raw value.
///
/// # Errors
/// - Returns `Err(SettingsError::UnknownKey)` for keys this tool does not read.
/// - Returns `Err(SettingsError::InvalidValue)` when the value does not parse;
///   `config` is left unchanged.
///
/// Details:
/// - Timeouts below the minimum are raised to it; concurrency is clamped to
///   `1..=16`. Both log a warning.
pub fn apply_setting(
    config: &mut RuntimeConfig,
    key: &str,
    value: &str,
) -> Result<(), SettingsError> {
    let invalid = || SettingsError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };
    match key {
        "debug_logging" | "debug" => {
            config.debug_logging = parse_bool(value).ok_or_else(invalid)?;
        }
        "warning_threshold" | "threshold" => {
            config.warning_threshold = value.trim().parse().map_err(|_| invalid())?;
        }
        "timeout" | "timeout_secs" => {
            let secs: u64 = value.trim().parse().map_err(|_| invalid())?;
            if secs < MIN_TIMEOUT_SECS {
                tracing::warn!(secs, min = MIN_TIMEOUT_SECS, "timeout raised to minimum");
            }
            config.timeout_secs = secs.max(MIN_TIMEOUT_SECS);
        }
        "policy_concurrency" => {
            let n: usize = value.trim().parse().map_err(|_| invalid())?;
            let clamped = n.clamp(1, MAX_POLICY_CONCURRENCY);
            if clamped != n {
                tracing::warn!(requested = n, used = clamped, "policy_concurrency clamped");
            }
            config.policy_concurrency = clamped;
        }
        "lists_dir" => {
            let dir = value.trim();
            if dir.is_empty() {
                return Err(invalid());
            }
            config.lists_dir = PathBuf::from(dir);
        }
        _ => {
            return Err(SettingsError::UnknownKey {
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

/// What: Apply every setting in a `settings.conf` body.
///
/// Details:
/// - Comment and blank lines are skipped; lines without `=` are ignored.
/// - Unknown keys and invalid values are logged and skipped.
pub fn apply_file(config: &mut RuntimeConfig, content: &str) {
    for line in content.lines() {
        if skip_comment_or_empty(line) {
            continue;
        }
        let Some((key, value)) = parse_key_value(line) else {
            tracing::debug!(line, "ignoring settings line without '='");
            continue;
        };
        if let Err(err) = apply_setting(config, &key, &value) {
            tracing::warn!(error = %err, "ignoring settings entry");
        }
    }
}

/// What: Apply environment overrides through a lookup function.
///
/// Inputs:
/// - `lookup`: Returns the value of an environment variable, if set.
pub fn apply_env<F>(config: &mut RuntimeConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for (var, key) in ENV_KEYS {
        let Some(value) = lookup(var) else {
            continue;
        };
        if let Err(err) = apply_setting(config, key, &value) {
            tracing::warn!(var, error = %err, "ignoring environment override");
        }
    }
}
