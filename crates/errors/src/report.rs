//! Report submission failure codes
//!
//! These are the terminal reasons a report can end up in the `Failed` state.
//! They are plain codes rather than rich errors so a host UI can map them to
//! localized strings.

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ReportError {
    /// No report token is configured.
    #[error("no report token configured")]
    NoRequestToken,

    /// The report has no textual content.
    #[error("report has no content")]
    NoContent,

    /// The transport could not dispatch the metadata request.
    #[error("unable to process report request")]
    UnableToProcess,

    /// The metadata endpoint answered with a non-2xx status.
    #[error("report endpoint returned an error response")]
    ErrorResponse,

    /// Reserved for hosts that detect missing connectivity up front.
    #[error("no connection to the report service")]
    NoConnection,
}

impl ReportError {
    /// Stable wire/localization key for this failure.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::NoRequestToken => "NO_REPORT_TOKEN",
            Self::NoContent => "NO_CONTENT",
            Self::UnableToProcess => "UNABLE_TO_PROCESS",
            Self::ErrorResponse => "HTTP_ERROR",
            Self::NoConnection => "NO_CONNECTION",
        }
    }
}

impl UserFacingError for ReportError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NoRequestToken => Some(
                "Set `api.report_token` in the config file or export BUGLINE_REPORT_TOKEN.",
            ),
            Self::NoContent => Some("Describe the problem with --content or --content-file."),
            Self::UnableToProcess | Self::NoConnection => {
                Some("Check your network connection and the configured API URL.")
            }
            Self::ErrorResponse => Some("Verify the report token is still valid."),
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UnableToProcess | Self::ErrorResponse | Self::NoConnection
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(self.code())
    }
}
