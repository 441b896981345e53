//! Logging configuration for dnswatch

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::logging::VerbosityState;

/// Logging section of the daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Log file path; relative paths are resolved against the home directory
    /// when running as a service. Empty means console only.
    #[serde(default)]
    pub log_path: String,

    /// Directory used instead of the user's home for relative log paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_dir: Option<PathBuf>,

    /// Number of `-v` flags given
    #[serde(default)]
    pub verbose: u8,

    /// Suppress all log output
    #[serde(default)]
    pub silent: bool,

    /// Level name ("debug", "info" or "notice") used when no `-v` flag is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Keep the previous log as `<log_path>.1` and start a fresh file
    #[serde(default)]
    pub backup_on_start: bool,
}

impl LogConfig {
    /// Load configuration from the default file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from `path`, or return default if not found
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Verbosity flags carried by this configuration
    pub fn verbosity(&self) -> VerbosityState {
        VerbosityState::new(self.silent, self.verbose)
    }
}

/// Get the base configuration directory (~/.dnswatch)
/// Falls back to ./.dnswatch if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    try_config_dir().unwrap_or_else(|| PathBuf::from(".dnswatch"))
}

/// Try to get the base configuration directory, returning None if home dir is unavailable
pub fn try_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".dnswatch"))
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert!(config.log_path.is_empty());
        assert_eq!(config.verbose, 0);
        assert!(!config.silent);
        assert!(!config.backup_on_start);
        assert_eq!(config.verbosity(), VerbosityState::default());
    }

    #[test]
    fn test_config_serialization() {
        let config = LogConfig {
            log_path: "logs/dnswatch.log".to_string(),
            home_dir: Some(PathBuf::from("/opt/dnswatch")),
            verbose: 2,
            silent: false,
            log_level: Some("info".to_string()),
            backup_on_start: true,
        };
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: LogConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: LogConfig = toml::from_str("log_path = \"/var/log/dnswatch.log\"").unwrap();
        assert_eq!(parsed.log_path, "/var/log/dnswatch.log");
        assert_eq!(parsed.home_dir, None);
        assert_eq!(parsed.log_level, None);
        assert_eq!(parsed.verbose, 0);
    }

    #[test]
    fn test_load_from_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = LogConfig::load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, LogConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "silent = true\nverbose = 3\n").unwrap();

        let config = LogConfig::load_from(&path).unwrap();
        assert_eq!(config.verbosity(), VerbosityState::new(true, 3));
    }

    #[test]
    fn test_load_from_invalid_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "verbose = \"lots\"").unwrap();

        assert!(LogConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_config_dir_does_not_panic() {
        let dir = config_dir();
        assert!(dir.ends_with(".dnswatch"));
        assert!(config_file_path().ends_with("config.toml"));
    }
}
