//! Network-related error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    #[error("connection timeout to {url}")]
    Timeout { url: String },

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error {status}: {message}")]
    HttpError { status: u16, message: String },

    #[error("SSL/TLS error: {0}")]
    TlsError(String),

    #[error("network unavailable")]
    NetworkUnavailable,
}

impl UserFacingError for NetworkError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Timeout { .. } | Self::ConnectionRefused(_) | Self::NetworkUnavailable => {
                Some("Check your network connection and the configured API URL.")
            }
            Self::InvalidUrl(_) => Some("Fix the `api.base_url` setting."),
            Self::TlsError(_) => Some("Verify the server certificate or proxy settings."),
            Self::HttpError { .. } | Self::RequestFailed(_) => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::ConnectionRefused(_) | Self::NetworkUnavailable => true,
            Self::HttpError { status, .. } => *status >= 500,
            Self::RequestFailed(_) | Self::InvalidUrl(_) | Self::TlsError(_) => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::Timeout { .. } => "network.timeout",
            Self::RequestFailed(_) => "network.request_failed",
            Self::ConnectionRefused(_) => "network.connection_refused",
            Self::InvalidUrl(_) => "network.invalid_url",
            Self::HttpError { .. } => "network.http_error",
            Self::TlsError(_) => "network.tls_error",
            Self::NetworkUnavailable => "network.unavailable",
        })
    }
}
