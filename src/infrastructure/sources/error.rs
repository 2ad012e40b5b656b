//! # Probe Errors
//!
//! Why a single locale produced no raw price string.

use crate::infrastructure::http::error::FetchError;
use thiserror::Error;

/// Error type for source probes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The fetch itself failed.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The item does not exist in this locale.
    #[error("item not found")]
    NotFound,

    /// The page exists but lacks the required feature marker.
    #[error("page has no '{marker}' section")]
    FeatureAbsent {
        /// The marker that was looked for.
        marker: String,
    },

    /// The server returned an empty body.
    #[error("empty response")]
    EmptyResponse,

    /// No extraction pattern matched.
    #[error("no price found")]
    NoPriceFound,
}

impl ProbeError {
    /// Creates a feature-absent error.
    #[must_use]
    pub fn feature_absent(marker: impl Into<String>) -> Self {
        Self::FeatureAbsent {
            marker: marker.into(),
        }
    }

    /// Returns true when the item or feature simply does not exist here.
    ///
    /// These are expected for many locales and are logged at debug level.
    #[must_use]
    pub fn is_absence(&self) -> bool {
        matches!(self, Self::NotFound | Self::FeatureAbsent { .. })
    }

    /// Returns true if the probe was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Fetch(FetchError::Cancelled))
    }
}

/// Result type for probes.
pub type ProbeResult<T> = Result<T, ProbeError>;
