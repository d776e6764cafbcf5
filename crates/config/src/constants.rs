//! Fixed values shared by the config defaults and the CLI

/// Report service used when no `api.base_url` is configured
pub const DEFAULT_API_URL: &str = "https://api.codecks.io";

/// Path of the report creation endpoint relative to the API base URL
pub const CREATE_REPORT_PATH: &str = "user-report/v1/create-report";

/// Directory name under the platform config/data directories
pub const APP_DIR: &str = "bugline";

pub const CONFIG_FILE: &str = "config.toml";

pub const LOGS_DIR: &str = "logs";
