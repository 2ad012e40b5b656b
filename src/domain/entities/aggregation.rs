//! # Aggregation Result
//!
//! The outcome of one multi-locale run: the ordered observations plus a
//! record of every locale that produced none.

use crate::domain::entities::observation::PriceObservation;
use crate::domain::value_objects::{ItemId, Locale};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a locale produced no observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The fetch failed after retries.
    Fetch,
    /// The item does not exist in the locale.
    NotFound,
    /// The page lacks the required feature.
    FeatureAbsent,
    /// The source returned nothing.
    EmptyResponse,
    /// No price string could be extracted.
    NoPriceFound,
    /// The price string could not be parsed.
    Parse,
    /// The locale's task crashed.
    TaskFault,
    /// The run was cancelled before the locale finished.
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetch => "fetch",
            Self::NotFound => "not_found",
            Self::FeatureAbsent => "feature_absent",
            Self::EmptyResponse => "empty_response",
            Self::NoPriceFound => "no_price_found",
            Self::Parse => "parse",
            Self::TaskFault => "task_fault",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// A failed locale and the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleFailureRecord {
    /// The locale.
    pub locale: Locale,
    /// Failure category.
    pub kind: FailureKind,
    /// Human-readable detail.
    pub reason: String,
}

impl LocaleFailureRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(locale: Locale, kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            locale,
            kind,
            reason: reason.into(),
        }
    }
}

/// Result of aggregating one item across locales.
///
/// Observations are kept sorted ascending by `max_usd`; ties keep the
/// order in which they were supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    item: ItemId,
    observations: Vec<PriceObservation>,
    failures: Vec<LocaleFailureRecord>,
    locales_queried: usize,
}

impl AggregationResult {
    /// Creates a result, sorting the observations.
    #[must_use]
    pub fn new(
        item: ItemId,
        mut observations: Vec<PriceObservation>,
        failures: Vec<LocaleFailureRecord>,
        locales_queried: usize,
    ) -> Self {
        observations.sort_by_key(PriceObservation::max_usd);
        Self {
            item,
            observations,
            failures,
            locales_queried,
        }
    }

    /// The item.
    #[must_use]
    pub fn item(&self) -> &ItemId {
        &self.item
    }

    /// Observations, cheapest maximum first.
    #[must_use]
    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    /// Failed locales.
    #[must_use]
    pub fn failures(&self) -> &[LocaleFailureRecord] {
        &self.failures
    }

    /// Number of locales with an observation.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.observations.len()
    }

    /// Number of locales without one.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Number of locales in the run.
    #[must_use]
    pub fn locales_queried(&self) -> usize {
        self.locales_queried
    }
}

impl fmt::Display for AggregationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} of {} locales priced, {} failed",
            self.item,
            self.succeeded(),
            self.locales_queried,
            self.failed()
        )
    }
}
