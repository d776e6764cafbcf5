use serde::{Deserialize, Serialize};

/// Free-form diagnostics that don't belong to a specific domain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    /// Something went wrong but the submission carries on
    Warning { message: String },

    /// Generic error message
    Error { message: String },

    /// Developer-facing trace output
    DebugLog { message: String },
}

impl GeneralEvent {
    /// Create a warning event
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
        }
    }

    /// Create an error event
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Create a debug log event
    pub fn debug(message: impl Into<String>) -> Self {
        Self::DebugLog {
            message: message.into(),
        }
    }
}
