//! Constants and user settings persistence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

/// Default timeout for one dig invocation.
pub const DIG_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for the one-off `dig -v` availability probe.
pub const AVAILABILITY_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Window inside which a repeated identical query updates its existing
/// history entry instead of appending a new one.
pub const HISTORY_DEDUP_WINDOW: Duration = Duration::from_secs(5 * 60);
/// Default history capacity.
pub const DEFAULT_MAX_HISTORY: usize = 100;
/// Application directory name under the XDG base directories.
pub const APP_DIR: &str = "digger";
/// History file name under the app data directory.
pub const HISTORY_FILE: &str = "history.json";
/// Settings file name under the app config directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Logging verbosity selected on the command line.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// User preferences, persisted as a JSON document.
///
/// Every field carries a serde default so a partially-present file is
/// merged over the defaults rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// "follow-system", "light" or "dark".
    pub theme: String,
    pub auto_cleanup_enabled: bool,
    /// Retention in days applied when auto-cleanup is enabled.
    pub cleanup_days: u32,
    /// Whether completed queries are recorded into history.
    pub save_queries: bool,
    pub default_record_type: String,
    pub confirm_clear: bool,
    /// History capacity handed to `QueryHistory::set_max_entries`.
    pub history_limit: usize,
    /// Per-query timeout in seconds.
    pub query_timeout: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            theme: "follow-system".to_string(),
            auto_cleanup_enabled: false,
            cleanup_days: 30,
            save_queries: true,
            default_record_type: "A".to_string(),
            confirm_clear: true,
            history_limit: 1000,
            query_timeout: 10,
        }
    }
}

impl Settings {
    /// Resolves `digger/settings.json` under the user config directory.
    pub fn config_path() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.config_dir().join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Loads settings from `path`, degrading to defaults on any read or
    /// parse failure.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("Could not parse settings file {}: {e}", path.display());
                    Settings::default()
                }
            },
            Err(_) => Settings::default(),
        }
    }

    /// Loads from the default location, or defaults when no config
    /// directory can be resolved.
    pub fn load_default() -> Self {
        match Self::config_path() {
            Some(path) => Self::load(&path),
            None => Settings::default(),
        }
    }

    /// Writes the settings as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// The per-query timeout as a `Duration`.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.theme, "follow-system");
        assert_eq!(settings.default_record_type, "A");
        assert_eq!(settings.history_limit, 1000);
        assert_eq!(settings.query_timeout, 10);
        assert!(settings.save_queries);
        assert!(!settings.auto_cleanup_enabled);
    }

    #[test]
    fn partial_file_merges_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"theme": "dark", "history_limit": 50}"#).unwrap();

        let settings = Settings::load(&path);
        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.history_limit, 50);
        // Untouched keys keep their defaults.
        assert_eq!(settings.cleanup_days, 30);
        assert!(settings.confirm_clear);
    }

    #[test]
    fn corrupt_file_degrades_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json {").unwrap();
        let settings = Settings::load(&path);
        assert_eq!(settings.theme, "follow-system");
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = Settings::default();
        settings.query_timeout = 5;
        settings.auto_cleanup_enabled = true;
        settings.save(&path).unwrap();

        let reloaded = Settings::load(&path);
        assert_eq!(reloaded.query_timeout, 5);
        assert!(reloaded.auto_cleanup_enabled);
    }
}
