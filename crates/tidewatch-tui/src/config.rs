//! Configuration file management.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tidewatch_core::{BackoffPolicy, DriverConfig, DEFAULT_BASE_URL, DEFAULT_RESULTS};

/// Configuration file structure.
///
/// Loaded from `<config dir>/tidewatch/config.toml`; a missing file
/// yields the defaults. CLI flags override individual fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Absolute base URL of the telemetry API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Number of history readings to request per channel.
    #[serde(default = "default_results")]
    pub results: u32,

    /// Seconds between latest-only refreshes.
    #[serde(default = "default_latest_interval")]
    pub latest_interval_secs: u64,

    /// Seconds between history/chart refreshes.
    #[serde(default = "default_history_interval")]
    pub history_interval_secs: u64,

    /// Directory CSV exports are written to (default: working directory).
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    /// Log file path; logging is disabled when unset since the
    /// dashboard owns the terminal.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_api_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_results() -> u32 {
    DEFAULT_RESULTS
}

fn default_latest_interval() -> u64 {
    120
}

fn default_history_interval() -> u64 {
    600
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            results: default_results(),
            latest_interval_secs: default_latest_interval(),
            history_interval_secs: default_history_interval(),
            export_dir: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Path of the configuration file, if a config directory exists on
    /// this platform.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tidewatch").join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when no file
    /// is present.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Refresh driver configuration derived from this file.
    #[must_use]
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            latest_interval: Duration::from_secs(self.latest_interval_secs),
            history_interval: Duration::from_secs(self.history_interval_secs),
            backoff: BackoffPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:3000/api");
        assert_eq!(config.results, 100);
        assert_eq!(config.latest_interval_secs, 120);
        assert_eq!(config.history_interval_secs, 600);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(r#"api_url = "https://example.net/api""#).unwrap();
        assert_eq!(config.api_url, "https://example.net/api");
        assert_eq!(config.results, 100);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_driver_config_uses_configured_intervals() {
        let config: Config = toml::from_str(
            "latest_interval_secs = 30\nhistory_interval_secs = 90\n",
        )
        .unwrap();

        let driver = config.driver_config();
        assert_eq!(driver.latest_interval, Duration::from_secs(30));
        assert_eq!(driver.history_interval, Duration::from_secs(90));
        assert_eq!(driver.backoff.max_attempts, 5);
    }
}
