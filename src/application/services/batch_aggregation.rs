//! # Batch Aggregator
//!
//! Drives a [`SourceProbe`] across every locale and reduces the outcomes
//! into an [`AggregationResult`].
//!
//! Locales are processed in fixed-size batches, one after another. Inside
//! a batch every locale runs as its own task, each holding a permit from a
//! semaphore shared by the whole run, so at most `max_in_flight` probes are
//! outstanding at once. Each task yields `Result<PriceObservation,
//! LocaleFailure>`; the aggregator folds those in locale order. A task that
//! panics is recorded as a [`LocaleFailure::TaskFault`] for its locale and
//! the run carries on.

use crate::application::error::{AggregationError, AggregationResultType};
use crate::application::services::progress::{
    BatchProgress, ProgressReporter, TracingProgressReporter,
};
use crate::domain::entities::{
    AggregationResult, FailureKind, LocaleFailureRecord, PriceObservation,
};
use crate::domain::services::{CurrencyConverter, ParseError, PriceStringParser};
use crate::domain::value_objects::{CurrencyCode, ItemId, Locale};
use crate::infrastructure::sources::{ProbeError, SourceProbe};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default locales per batch.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Default concurrent probes.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 5;

/// Configuration for batch aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Locales per batch.
    pub batch_size: usize,
    /// Maximum concurrent probes.
    pub max_in_flight: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl AggregationConfig {
    /// Sets the batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the concurrency bound.
    #[must_use]
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }
}

/// Why one locale produced no observation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleFailure {
    /// The probe failed.
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// The raw string could not be parsed.
    #[error("unparseable price: {0}")]
    Parse(#[from] ParseError),

    /// The locale's task panicked or was aborted.
    #[error("task panicked: {message}")]
    TaskFault {
        /// Join error text.
        message: String,
    },
}

impl LocaleFailure {
    /// Creates a task fault.
    #[must_use]
    pub fn task_fault(message: impl Into<String>) -> Self {
        Self::TaskFault {
            message: message.into(),
        }
    }

    /// Failure category.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Probe(e) if e.is_cancelled() => FailureKind::Cancelled,
            Self::Probe(ProbeError::Fetch(_)) => FailureKind::Fetch,
            Self::Probe(ProbeError::NotFound) => FailureKind::NotFound,
            Self::Probe(ProbeError::FeatureAbsent { .. }) => FailureKind::FeatureAbsent,
            Self::Probe(ProbeError::EmptyResponse) => FailureKind::EmptyResponse,
            Self::Probe(ProbeError::NoPriceFound) => FailureKind::NoPriceFound,
            Self::Parse(_) => FailureKind::Parse,
            Self::TaskFault { .. } => FailureKind::TaskFault,
        }
    }

    /// Converts into a report record.
    #[must_use]
    pub fn into_record(self, locale: Locale) -> LocaleFailureRecord {
        LocaleFailureRecord::new(locale, self.kind(), self.to_string())
    }
}

/// Everything one locale task needs.
struct LocaleTask {
    probe: Arc<dyn SourceProbe>,
    parser: PriceStringParser,
    converter: CurrencyConverter,
    report_currency: CurrencyCode,
    locale: Locale,
    item: ItemId,
    cancel: CancellationToken,
}

impl LocaleTask {
    async fn observe(&self) -> Result<PriceObservation, LocaleFailure> {
        let raw = self
            .probe
            .probe(&self.locale, &self.item, &self.cancel)
            .await?;

        let currency = self.locale.currency();
        let range = self.parser.parse_range(&raw, currency)?;
        let min_usd = self.converter.to_reference(range.min, currency);
        let max_usd = self.converter.to_reference(range.max, currency);
        let max_report_amount = self
            .converter
            .from_reference(max_usd, &self.report_currency);

        Ok(PriceObservation::new(
            self.locale.clone(),
            raw,
            min_usd,
            max_usd,
            self.report_currency.clone(),
            max_report_amount,
        ))
    }
}

/// Runs probes across locales in bounded-parallel batches.
#[derive(Debug, Clone)]
pub struct BatchAggregator {
    probe: Arc<dyn SourceProbe>,
    parser: PriceStringParser,
    report_currency: CurrencyCode,
    progress: Arc<dyn ProgressReporter>,
    config: AggregationConfig,
}

impl BatchAggregator {
    /// Creates an aggregator.
    #[must_use]
    pub fn new(
        probe: Arc<dyn SourceProbe>,
        report_currency: CurrencyCode,
        config: AggregationConfig,
    ) -> Self {
        Self {
            probe,
            parser: PriceStringParser::new(),
            report_currency,
            progress: Arc::new(TracingProgressReporter),
            config,
        }
    }

    /// Replaces the progress reporter.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// The probe's store name.
    #[must_use]
    pub fn store(&self) -> &str {
        self.probe.store()
    }

    /// Collects and reduces observations for `item` across `locales`.
    ///
    /// # Errors
    ///
    /// - [`AggregationError::NoLocales`] if `locales` is empty
    /// - [`AggregationError::Cancelled`] if `cancel` fires during the run
    /// - [`AggregationError::NoObservations`] if every locale failed
    pub async fn run(
        &self,
        item: &ItemId,
        locales: &[Locale],
        converter: &CurrencyConverter,
        cancel: &CancellationToken,
    ) -> AggregationResultType<AggregationResult> {
        if locales.is_empty() {
            return Err(AggregationError::NoLocales);
        }

        let batch_size = self.config.batch_size.max(1);
        let total_batches = locales.len().div_ceil(batch_size);
        let permits = Arc::new(Semaphore::new(self.config.max_in_flight.max(1)));

        let mut observations = Vec::new();
        let mut failures = Vec::new();

        for (index, batch) in locales.chunks(batch_size).enumerate() {
            if cancel.is_cancelled() {
                return Err(AggregationError::Cancelled);
            }
            self.progress.report(&BatchProgress::new(
                index,
                total_batches,
                observations.len(),
                failures.len(),
            ));

            let handles: Vec<_> = batch
                .iter()
                .map(|locale| {
                    let task = LocaleTask {
                        probe: Arc::clone(&self.probe),
                        parser: self.parser,
                        converter: converter.clone(),
                        report_currency: self.report_currency.clone(),
                        locale: locale.clone(),
                        item: item.clone(),
                        cancel: cancel.clone(),
                    };
                    let permits = Arc::clone(&permits);
                    tokio::spawn(async move {
                        let _permit = permits
                            .acquire_owned()
                            .await
                            .map_err(|e| LocaleFailure::task_fault(e.to_string()))?;
                        task.observe().await
                    })
                })
                .collect();

            let outcomes = join_all(handles).await;

            for (locale, outcome) in batch.iter().zip(outcomes) {
                let outcome = outcome.unwrap_or_else(|e| Err(LocaleFailure::task_fault(e.to_string())));
                match outcome {
                    Ok(observation) => {
                        debug!(country = %locale.country(), raw = observation.raw(), "price observed");
                        observations.push(observation);
                    }
                    Err(failure) => {
                        log_failure(locale, &failure);
                        failures.push(failure.into_record(locale.clone()));
                    }
                }
            }
        }

        if cancel.is_cancelled() {
            return Err(AggregationError::Cancelled);
        }

        let result = AggregationResult::new(item.clone(), observations, failures, locales.len());
        info!(
            item = %item,
            succeeded = result.succeeded(),
            failed = result.failed(),
            locales = locales.len(),
            "aggregation finished"
        );

        if result.succeeded() == 0 {
            return Err(AggregationError::no_observations(result.failed()));
        }
        Ok(result)
    }
}

fn log_failure(locale: &Locale, failure: &LocaleFailure) {
    match failure {
        LocaleFailure::Probe(e) if e.is_absence() || e.is_cancelled() => {
            debug!(country = %locale.country(), error = %failure, "locale skipped");
        }
        _ => warn!(country = %locale.country(), error = %failure, "locale failed"),
    }
}
