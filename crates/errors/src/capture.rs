//! Screenshot capture error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("frame buffer has {actual} bytes, expected {expected}")]
    InvalidFrame { expected: usize, actual: usize },

    #[error("failed to encode screenshot: {0}")]
    EncodeFailed(String),

    #[error("screenshot source dropped the capture request")]
    SourceDropped,

    #[error("no screenshot source configured")]
    NoSource,
}

impl UserFacingError for CaptureError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::InvalidFrame { .. } => "capture.invalid_frame",
            Self::EncodeFailed(_) => "capture.encode_failed",
            Self::SourceDropped => "capture.source_dropped",
            Self::NoSource => "capture.no_source",
        })
    }
}
