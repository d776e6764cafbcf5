//! Configuration sections

use crate::constants::DEFAULT_API_URL;
use bugline_types::Severity;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Report service access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Token issued by the report service; empty means "not configured"
    #[serde(default)]
    pub report_token: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            report_token: String::new(),
        }
    }
}

impl ApiConfig {
    /// The report token, or `None` when it is empty or whitespace
    #[must_use]
    pub fn report_token(&self) -> Option<&str> {
        let token = self.report_token.trim();
        (!token.is_empty()).then_some(token)
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl NetworkConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

/// Defaults applied to new reports
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportDefaults {
    #[serde(default)]
    pub default_severity: Severity,
    #[serde(default)]
    pub user_email: String,
}

// Default value functions for serde
fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
    300 // 5 minutes, screenshots can be large
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("bugline/{}", env!("CARGO_PKG_VERSION"))
}
