use serde::{Deserialize, Serialize};

use crate::EventSource;
use bugline_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, e.g. `NO_CONTENT`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether resubmitting might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod capture;
pub mod general;
pub mod progress;
pub mod report;
pub mod upload;

pub use capture::*;
pub use general::*;
pub use progress::*;
pub use report::*;
pub use upload::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Free-form warnings, errors and debug output
    General(GeneralEvent),

    /// Report lifecycle events
    Report(ReportEvent),

    /// Attachment upload events
    Upload(UploadEvent),

    /// Screenshot capture events
    Capture(CaptureEvent),

    /// Byte-level progress
    Progress(ProgressEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Report(_) => EventSource::REPORT,
            Self::Upload(_) => EventSource::UPLOAD,
            Self::Capture(_) => EventSource::CAPTURE,
            Self::Progress(_) => EventSource::PROGRESS,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. })
            | Self::Report(ReportEvent::Failed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Report(ReportEvent::TransitionRejected { .. })
            | Self::Upload(
                UploadEvent::TargetInvalid { .. }
                | UploadEvent::Rejected { .. }
                | UploadEvent::Errored { .. },
            )
            | Self::Capture(CaptureEvent::Failed { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Upload(UploadEvent::TargetUnmatched { .. })
            | Self::Capture(CaptureEvent::FrameReceived { .. }) => Level::DEBUG,

            Self::Progress(_) => Level::TRACE,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "bugline::events::general",
            Self::Report(_) => "bugline::events::report",
            Self::Upload(_) => "bugline::events::upload",
            Self::Capture(_) => "bugline::events::capture",
            Self::Progress(_) => "bugline::events::progress",
        }
    }
}
