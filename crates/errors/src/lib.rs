#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for bugline
//!
//! This crate provides fine-grained error types organized by domain.
//! All error types implement Clone where possible for easier handling.

use std::borrow::Cow;

use thiserror::Error;

pub mod capture;
pub mod config;
pub mod network;
pub mod report;

// Re-export all error types at the root
pub use capture::CaptureError;
pub use config::ConfigError;
pub use network::NetworkError;
pub use report::ReportError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("report error: {0}")]
    Report(#[from] ReportError),

    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("report is already active")]
    AlreadyActive,

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
        path: Option<std::path::PathBuf>,
    },
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an Io error with an associated path
    pub fn io_with_path(err: &std::io::Error, path: impl Into<std::path::PathBuf>) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: Some(path.into()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}

/// Result type alias for bugline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for analytics / structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Network(err) => err.user_message(),
            Error::Report(err) => err.user_message(),
            Error::Io { message, .. } => Cow::Owned(message.clone()),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Network(err) => err.user_hint(),
            Error::Config(err) => err.user_hint(),
            Error::Report(err) => err.user_hint(),
            Error::AlreadyActive => Some("Create a new report to submit again."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(err) => err.is_retryable(),
            Error::Report(err) => err.is_retryable(),
            Error::Io { .. } => true,
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Network(err) => err.user_code(),
            Error::Config(err) => err.user_code(),
            Error::Report(err) => err.user_code(),
            Error::Capture(err) => err.user_code(),
            Error::AlreadyActive => Some("error.already_active"),
            Error::Internal(_) => Some("error.internal"),
            Error::Io { .. } => Some("error.io"),
        }
    }
}
