//! Integration tests for settings files feeding the engine configuration.

#![cfg(test)]

use std::io::Write;
use std::path::Path;

use aptpulse::logic::EngineConfig;
use aptpulse::settings::{RuntimeConfig, apply_env, apply_file, settings_candidates};

#[test]
/// What: A settings file plus environment overrides produce the engine configuration.
///
/// Inputs:
/// - File setting threshold, concurrency and lists directory; env overriding the threshold.
///
/// Output:
/// - `EngineConfig` reflects the merged values with env taking precedence.
fn integration_settings_to_engine_config() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(
        file,
        "# monitoring host\nwarning_threshold = 40\npolicy_concurrency = 4\nlists_dir = /srv/apt/lists  # mirror"
    )
    .expect("write");
    let content = std::fs::read_to_string(file.path()).expect("read back");

    let mut config = RuntimeConfig::default();
    apply_file(&mut config, &content);
    apply_env(&mut config, |var| {
        (var == "APTPULSE_WARNING_THRESHOLD").then(|| "5".to_string())
    });

    let engine = EngineConfig::from(&config);
    assert_eq!(engine.warning_threshold, 5);
    assert_eq!(engine.policy_concurrency, 4);
    assert_eq!(engine.lists_dir, Path::new("/srv/apt/lists"));
}

#[test]
fn integration_candidate_paths_order() {
    let candidates = settings_candidates(Some("/etc/xdg"), Some("/root"));
    assert_eq!(candidates.len(), 2);
    assert!(candidates[0].starts_with("/etc/xdg/aptpulse"));
    assert!(candidates[1].ends_with(".config/aptpulse/settings.conf"));
}
