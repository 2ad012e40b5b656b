//! # Application Errors
//!
//! Error types for the application layer.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── InvalidItem(ItemIdError)        - Caller supplied an unusable item
//! ├── QuotaExceeded { caller, .. }    - Per-caller request quota hit
//! ├── Aggregation(AggregationError)   - No usable observations
//! ├── Report(ReportError)             - Report could not be written
//! └── Configuration(String)           - Services could not be built
//! ```
//!
//! # Examples
//!
//! ```
//! use regional_price_scan::application::error::{AggregationError, ApplicationError};
//!
//! let err: ApplicationError = AggregationError::no_observations(48).into();
//! assert!(err.is_empty_result());
//! assert!(err.to_string().contains("48"));
//! ```

use crate::domain::value_objects::ItemIdError;
use crate::infrastructure::report::error::ReportError;
use std::time::Duration;
use thiserror::Error;

/// Error type for a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    /// The run was given no locales.
    #[error("no locales to query")]
    NoLocales,

    /// Every locale failed.
    #[error("no price observations: all {failed} locales failed")]
    NoObservations {
        /// Number of failed locales.
        failed: usize,
    },

    /// The run was cancelled.
    #[error("aggregation cancelled")]
    Cancelled,
}

impl AggregationError {
    /// Creates an empty-result error.
    #[must_use]
    pub fn no_observations(failed: usize) -> Self {
        Self::NoObservations { failed }
    }
}

/// Result type for batch runs.
pub type AggregationResultType<T> = Result<T, AggregationError>;

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The item identifier or store URL was rejected.
    #[error("invalid item: {0}")]
    InvalidItem(#[from] ItemIdError),

    /// The caller has used up their request quota.
    #[error("request quota exceeded for {caller}, retry in {}s", retry_after.as_secs())]
    QuotaExceeded {
        /// Caller identifier.
        caller: String,
        /// Time until the next request is allowed.
        retry_after: Duration,
    },

    /// The batch run failed as a whole.
    #[error("aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),

    /// The report sink failed.
    #[error("report failed: {0}")]
    Report(#[from] ReportError),

    /// Service construction failed.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Creates a quota error.
    #[must_use]
    pub fn quota_exceeded(caller: impl Into<String>, retry_after: Duration) -> Self {
        Self::QuotaExceeded {
            caller: caller.into(),
            retry_after,
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns true if no locale yielded a price.
    #[must_use]
    pub fn is_empty_result(&self) -> bool {
        matches!(
            self,
            Self::Aggregation(AggregationError::NoObservations { .. })
        )
    }

    /// Returns true if the caller should simply try again later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
