//! CLI error handling

use std::fmt;

use bugline_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(bugline_errors::ConfigError),
    /// Error from the report pipeline
    Report(bugline_errors::Error),
    /// Invalid command arguments
    InvalidArguments(String),
    /// I/O error
    Io(std::io::Error),
}

impl CliError {
    /// Stable error code for JSON output
    pub fn code(&self) -> Option<&'static str> {
        match self {
            CliError::Config(e) => e.user_code(),
            CliError::Report(e) => e.user_code(),
            CliError::InvalidArguments(_) => Some("cli.invalid_arguments"),
            CliError::Io(_) => None,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => {
                write!(f, "Configuration error: {e}")?;
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                Ok(())
            }
            CliError::Report(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to resubmit the report.")?;
                }
                Ok(())
            }
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Report(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::InvalidArguments(_) => None,
        }
    }
}

impl From<bugline_errors::ConfigError> for CliError {
    fn from(e: bugline_errors::ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<bugline_errors::Error> for CliError {
    fn from(e: bugline_errors::Error) -> Self {
        match e {
            bugline_errors::Error::Config(e) => CliError::Config(e),
            other => CliError::Report(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
