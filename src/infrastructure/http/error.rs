//! # Fetch Errors
//!
//! Error types for outbound HTTP fetches.
//!
//! A `404` is deliberately *not* represented here: structural absence is a
//! successful fetch outcome (see [`FetchOutcome`](super::retry::FetchOutcome)),
//! so callers must branch on it before treating a fetch as failed.
//!
//! # Examples
//!
//! ```
//! use regional_price_scan::infrastructure::http::error::FetchError;
//!
//! let error = FetchError::timeout("attempt timed out after 15000ms");
//! assert!(error.is_retryable());
//!
//! let error = FetchError::exhausted(3, FetchError::status(503));
//! assert!(!error.is_retryable());
//! assert_eq!(error.attempts(), Some(3));
//! ```

use thiserror::Error;

/// Error type for fetch operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// A single attempt timed out.
    #[error("fetch timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
    },

    /// Network or transport error.
    #[error("fetch transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
    },

    /// The server answered with a non-success, non-404 status.
    #[error("unexpected http status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be read.
    #[error("failed to read response body: {message}")]
    Body {
        /// Error message.
        message: String,
    },

    /// Every attempt failed; carries the last failure.
    #[error("giving up after {attempts} attempts: {last}")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The failure of the final attempt.
        last: Box<FetchError>,
    },

    /// The fetch was cancelled while waiting.
    #[error("fetch cancelled")]
    Cancelled,

    /// The HTTP client could not be constructed.
    #[error("http client error: {message}")]
    Client {
        /// Error message.
        message: String,
    },
}

impl FetchError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a status error.
    #[must_use]
    pub fn status(status: u16) -> Self {
        Self::Status { status }
    }

    /// Creates a body read error.
    #[must_use]
    pub fn body(message: impl Into<String>) -> Self {
        Self::Body {
            message: message.into(),
        }
    }

    /// Creates an exhausted-retries error.
    #[must_use]
    pub fn exhausted(attempts: u32, last: FetchError) -> Self {
        Self::Exhausted {
            attempts,
            last: Box::new(last),
        }
    }

    /// Creates a client construction error.
    #[must_use]
    pub fn client(message: impl Into<String>) -> Self {
        Self::Client {
            message: message.into(),
        }
    }

    /// Returns true if another attempt may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Transport { .. } | Self::Status { .. } | Self::Body { .. }
        )
    }

    /// Number of attempts made, for exhausted errors.
    #[must_use]
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::Exhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    /// HTTP status of the last failure, if it was a status failure.
    #[must_use]
    pub fn last_status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            Self::Exhausted { last, .. } => last.last_status(),
            _ => None,
        }
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
