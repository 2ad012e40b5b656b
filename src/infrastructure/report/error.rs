//! # Report Errors

use thiserror::Error;

/// Error type for report sinks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Filesystem failure.
    #[error("report i/o error: {message}")]
    Io {
        /// Error message.
        message: String,
    },

    /// Encoding failure.
    #[error("report encoding error: {message}")]
    Encode {
        /// Error message.
        message: String,
    },
}

impl ReportError {
    /// Creates an i/o error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an encoding error.
    #[must_use]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ReportError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<csv::Error> for ReportError {
    fn from(error: csv::Error) -> Self {
        Self::encode(error.to_string())
    }
}

/// Result type for report sinks.
pub type ReportResult<T> = Result<T, ReportError>;
