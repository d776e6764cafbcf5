#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for bugline
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/bugline/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)

pub mod constants;
pub mod core;

pub use crate::core::{ApiConfig, NetworkConfig, ReportDefaults};

use bugline_errors::{ConfigError, Error};
use bugline_types::Severity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub report: ReportDefaults,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir
            .join(constants::APP_DIR)
            .join(constants::CONFIG_FILE))
    }

    /// Directory for debug log files
    #[must_use]
    pub fn logs_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(constants::APP_DIR)
            .join(constants::LOGS_DIR)
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Write configuration as TOML, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub async fn save_to_file(&self, path: &Path) -> Result<(), Error> {
        let contents = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            error: e.to_string(),
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError {
                    path: parent.display().to_string(),
                    error: e.to_string(),
                })?;
        }

        fs::write(path, contents)
            .await
            .map_err(|e| ConfigError::WriteError {
                path: path.display().to_string(),
                error: e.to_string(),
            })?;
        Ok(())
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // BUGLINE_API_URL
        if let Ok(url) = std::env::var("BUGLINE_API_URL") {
            if url.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "BUGLINE_API_URL".to_string(),
                    value: url,
                }
                .into());
            }
            self.api.base_url = url;
        }

        // BUGLINE_REPORT_TOKEN
        if let Ok(token) = std::env::var("BUGLINE_REPORT_TOKEN") {
            self.api.report_token = token;
        }

        // BUGLINE_TIMEOUT
        if let Ok(timeout) = std::env::var("BUGLINE_TIMEOUT") {
            self.network.timeout = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                field: "BUGLINE_TIMEOUT".to_string(),
                value: timeout,
            })?;
        }

        // BUGLINE_SEVERITY
        if let Ok(severity) = std::env::var("BUGLINE_SEVERITY") {
            self.report.default_severity =
                severity
                    .parse::<Severity>()
                    .map_err(|_| ConfigError::InvalidValue {
                        field: "BUGLINE_SEVERITY".to_string(),
                        value: severity,
                    })?;
        }

        // BUGLINE_USER_EMAIL
        if let Ok(email) = std::env::var("BUGLINE_USER_EMAIL") {
            self.report.user_email = email;
        }

        Ok(())
    }

    /// A copy safe to print: the report token is masked
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.api.report_token().is_some() {
            copy.api.report_token = "********".to_string();
        }
        copy
    }
}
