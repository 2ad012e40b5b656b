//! # Rate Errors

use thiserror::Error;

/// Error type for exchange-rate retrieval and snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatesError {
    /// The upstream request failed.
    #[error("rate request failed: {message}")]
    Request {
        /// Error message.
        message: String,
    },

    /// The document could not be decoded.
    #[error("invalid rate document: {message}")]
    Decode {
        /// Error message.
        message: String,
    },

    /// Reading or writing the snapshot failed.
    #[error("rate snapshot i/o error: {message}")]
    Io {
        /// Error message.
        message: String,
    },
}

impl RatesError {
    /// Creates a request error.
    #[must_use]
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates an i/o error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for RatesError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for RatesError {
    fn from(error: serde_json::Error) -> Self {
        Self::decode(error.to_string())
    }
}

/// Result type for rate operations.
pub type RatesResult<T> = Result<T, RatesError>;
