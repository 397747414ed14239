use std::env;
use std::path::{Path, PathBuf};

/// Directory name under the XDG config base.
const APP_DIR: &str = "aptpulse";
/// Settings file name.
const SETTINGS_FILE: &str = "settings.conf";

/// What: Candidate settings paths in priority order.
///
/// Inputs:
/// - `xdg_config`: Value of `XDG_CONFIG_HOME`, if set.
/// - `home`: Value of `HOME`, if set.
///
/// Output:
/// - `$XDG_CONFIG_HOME/aptpulse/settings.conf` first, then
///   `$HOME/.config/aptpulse/settings.conf`; blank values are skipped.
#[must_use]
pub fn settings_candidates(xdg_config: Option<&str>, home: Option<&str>) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(xdg) = xdg_config.filter(|x| !x.trim().is_empty()) {
        candidates.push(Path::new(xdg).join(APP_DIR).join(SETTINGS_FILE));
    }
    if let Some(h) = home.filter(|h| !h.trim().is_empty()) {
        candidates.push(
            Path::new(h)
                .join(".config")
                .join(APP_DIR)
                .join(SETTINGS_FILE),
        );
    }
    candidates
}

/// Determine the settings file from the environment; `None` when no candidate exists.
pub fn resolve_settings_config_path() -> Option<PathBuf> {
    let home = env::var("HOME").ok();
    let xdg_config = env::var("XDG_CONFIG_HOME").ok();
    settings_candidates(xdg_config.as_deref(), home.as_deref())
        .into_iter()
        .find(|p| p.is_file())
}
