//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("parse error: {message}")]
    ParseError { message: String },

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error("failed to write config to {path}: {error}")]
    WriteError { path: String, error: String },

    #[error("failed to serialize config: {error}")]
    SerializeError { error: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => {
                Some("Create ~/.config/bugline/config.toml or pass --config <PATH>.")
            }
            Self::MissingField { field } => Some(match field.as_str() {
                "report_token" => {
                    "Set `api.report_token` in the config file or export BUGLINE_REPORT_TOKEN."
                }
                _ => "Add the missing configuration field noted in the error message.",
            }),
            Self::InvalidValue { .. } | Self::ParseError { .. } => {
                Some("Fix the configuration value and retry the command.")
            }
            Self::EnvVarNotFound { .. } => {
                Some("Export the environment variable or move the value into the config file.")
            }
            Self::WriteError { .. } => Some("Ensure the config path is writable and retry."),
            Self::SerializeError { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::NotFound { .. } => "config.not_found",
            Self::ParseError { .. } => "config.parse_error",
            Self::MissingField { .. } => "config.missing_field",
            Self::InvalidValue { .. } => "config.invalid_value",
            Self::EnvVarNotFound { .. } => "config.env_var_not_found",
            Self::WriteError { .. } => "config.write_error",
            Self::SerializeError { .. } => "config.serialize_error",
        })
    }
}
