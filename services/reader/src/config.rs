//! services/reader/src/config.rs
//!
//! Defines the reader's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub log_level: Level,
    pub request_timeout: Duration,
    /// Profile to select at startup instead of the first one listed.
    pub preferred_user_id: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load API Settings ---
        let api_base_url = lookup("API_BASE_URL")
            .unwrap_or_else(|| "http://localhost:5000".to_string())
            .trim_end_matches('/')
            .to_string();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "API_BASE_URL".to_string(),
                format!("'{}' is not an http(s) URL", api_base_url),
            ));
        }

        let timeout_str = lookup("REQUEST_TIMEOUT_SECS").unwrap_or_else(|| "10".to_string());
        let timeout_secs = timeout_str.parse::<u64>().map_err(|e| {
            ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
        })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "REQUEST_TIMEOUT_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        // --- Load Logging ---
        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let preferred_user_id = lookup("READER_USER_ID").filter(|id| !id.trim().is_empty());

        Ok(Self {
            api_base_url,
            log_level,
            request_timeout: Duration::from_secs(timeout_secs),
            preferred_user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:5000");
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.preferred_user_id.is_none());
    }

    #[test]
    fn reads_overrides_and_trims_trailing_slash() {
        let config = load(&[
            ("API_BASE_URL", "https://library.example.com/"),
            ("RUST_LOG", "debug"),
            ("REQUEST_TIMEOUT_SECS", "3"),
            ("READER_USER_ID", "user_2"),
        ])
        .unwrap();
        assert_eq!(config.api_base_url, "https://library.example.com");
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.preferred_user_id.as_deref(), Some("user_2"));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            load(&[("REQUEST_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::InvalidValue(var, _)) if var == "REQUEST_TIMEOUT_SECS"
        ));
        assert!(matches!(
            load(&[("REQUEST_TIMEOUT_SECS", "0")]),
            Err(ConfigError::InvalidValue(_, _))
        ));
        assert!(matches!(
            load(&[("RUST_LOG", "chatty")]),
            Err(ConfigError::InvalidValue(var, _)) if var == "RUST_LOG"
        ));
        assert!(matches!(
            load(&[("API_BASE_URL", "ftp://library")]),
            Err(ConfigError::InvalidValue(var, _)) if var == "API_BASE_URL"
        ));
    }
}
