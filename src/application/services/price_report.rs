//! # Price Report Service
//!
//! The use case behind a caller's request: enforce the caller's quota,
//! bring exchange rates up to date, answer from the result cache when
//! possible, otherwise aggregate every locale, write the report and cache
//! its artifact.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::batch_aggregation::BatchAggregator;
use crate::application::services::caller_quota::CallerQuota;
use crate::config::AppConfig;
use crate::domain::entities::AggregationResult;
use crate::domain::value_objects::{ItemId, LocaleCatalog, Timestamp};
use crate::infrastructure::cache::{ArtifactRef, CacheKey, ResultCache};
use crate::infrastructure::http::{RateLimiter, ReqwestTransport, RetryingFetcher};
use crate::infrastructure::rates::RateTableService;
use crate::infrastructure::report::{CsvReportSink, ReportSink};
use crate::infrastructure::sources::StoreListingProbe;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// What a request produced.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    /// The report artifact.
    pub artifact: ArtifactRef,
    /// Whether the artifact came from the cache.
    pub from_cache: bool,
    /// The fresh aggregation; `None` on a cache hit.
    pub result: Option<AggregationResult>,
}

/// Service health snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    /// Entries in the result cache.
    pub cached_reports: usize,
    /// Locales queried per run.
    pub locales: usize,
    /// Currencies in the current rate table.
    pub rates_loaded: usize,
    /// When the current rates were fetched.
    pub rates_fetched_at: Timestamp,
}

/// Generates per-locale price reports.
#[derive(Debug)]
pub struct PriceReportService {
    aggregator: BatchAggregator,
    catalog: LocaleCatalog,
    rates: Arc<RateTableService>,
    cache: ResultCache,
    sink: Arc<dyn ReportSink>,
    quota: Option<CallerQuota>,
}

impl PriceReportService {
    /// Creates a service from its collaborators, without a caller quota.
    #[must_use]
    pub fn new(
        aggregator: BatchAggregator,
        catalog: LocaleCatalog,
        rates: Arc<RateTableService>,
        cache: ResultCache,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            aggregator,
            catalog,
            rates,
            cache,
            sink,
            quota: None,
        }
    }

    /// Enforces a per-caller quota.
    #[must_use]
    pub fn with_quota(mut self, quota: CallerQuota) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Wires the production collaborators from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::Configuration`] if the HTTP clients or
    /// extraction patterns cannot be built.
    pub fn from_config(config: &AppConfig) -> ApplicationResult<Self> {
        let transport = ReqwestTransport::new(&config.http)
            .map_err(|e| ApplicationError::configuration(e.to_string()))?;
        let fetcher = RetryingFetcher::new(
            Arc::new(transport),
            Arc::new(RateLimiter::from_config(&config.rate_limit)),
            config.retry.clone(),
        );
        let probe = StoreListingProbe::new(config.source.clone(), fetcher)
            .map_err(|e| ApplicationError::configuration(e.to_string()))?;
        let aggregator = BatchAggregator::new(
            Arc::new(probe),
            config.report.currency_code(),
            config.aggregation.clone(),
        );
        let rates = RateTableService::from_config(&config.rates)
            .map_err(|e| ApplicationError::configuration(e.to_string()))?;

        let service = Self::new(
            aggregator,
            config.locales.catalog(),
            Arc::new(rates),
            ResultCache::from_config(&config.cache),
            Arc::new(CsvReportSink::from_config(&config.report)),
        );
        Ok(if config.quota.enabled {
            service.with_quota(CallerQuota::new(&config.quota))
        } else {
            service
        })
    }

    /// Produces the report for `input`, a store URL or bare item id.
    ///
    /// # Errors
    ///
    /// - [`ApplicationError::QuotaExceeded`] if `caller` is over quota
    /// - [`ApplicationError::InvalidItem`] if `input` names no item
    /// - [`ApplicationError::Aggregation`] if no locale yielded a price
    /// - [`ApplicationError::Report`] if the report cannot be written
    #[instrument(skip(self, cancel))]
    pub async fn generate(
        &self,
        caller: &str,
        input: &str,
        cancel: &CancellationToken,
    ) -> ApplicationResult<ReportOutcome> {
        if let Some(quota) = &self.quota {
            quota
                .check(caller)
                .map_err(|retry_after| ApplicationError::quota_exceeded(caller, retry_after))?;
        }

        let item = ItemId::parse(input)?;
        let store = self.aggregator.store().to_string();
        let key = CacheKey::new(&item, &store);

        self.rates.refresh().await;

        if let Some(artifact) = self.cache.lookup(&key) {
            info!(key = %key, artifact = %artifact, "serving cached report");
            return Ok(ReportOutcome {
                artifact,
                from_cache: true,
                result: None,
            });
        }

        let converter = self.rates.converter();
        let locales = self.catalog.locales();
        let result = self
            .aggregator
            .run(&item, &locales, &converter, cancel)
            .await?;

        let artifact = self.sink.write(&result, &store).await?;
        self.cache.save(key, artifact.clone());

        Ok(ReportOutcome {
            artifact,
            from_cache: false,
            result: Some(result),
        })
    }

    /// Current service status.
    #[must_use]
    pub fn status(&self) -> ServiceStatus {
        let rates = self.rates.current();
        ServiceStatus {
            cached_reports: self.cache.len(),
            locales: self.catalog.len(),
            rates_loaded: rates.len(),
            rates_fetched_at: rates.fetched_at(),
        }
    }
}
