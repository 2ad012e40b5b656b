//! # Rate Table Service
//!
//! Keeps the process-wide [`RateTable`] current.
//!
//! A refresh is a no-op while the table in memory is younger than the TTL.
//! Otherwise a fresh-enough snapshot on disk is used, and only then is the
//! upstream source asked. When the source fails the service keeps what it
//! has: the table in memory, else the snapshot regardless of age, else an
//! empty table (every currency then converts at `1.0`).

use crate::domain::services::currency_converter::{CurrencyConverter, RateTable};
use crate::infrastructure::rates::error::RatesResult;
use crate::infrastructure::rates::snapshot::SnapshotStore;
use crate::infrastructure::rates::source::{DEFAULT_RATES_URL, HttpRateSource, RateSource};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Rates configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    /// Rate document URL.
    pub url: String,
    /// Snapshot file.
    pub snapshot_path: PathBuf,
    /// Maximum table age before a refresh, in seconds.
    pub ttl_secs: u64,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RATES_URL.to_string(),
            snapshot_path: PathBuf::from("./data/usd_rates.json"),
            ttl_secs: 24 * 60 * 60,
            timeout_ms: 15_000,
        }
    }
}

impl RatesConfig {
    /// Sets the document URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the snapshot path.
    #[must_use]
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = path.into();
        self
    }

    /// Maximum table age.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Owns the current rate table.
#[derive(Debug)]
pub struct RateTableService {
    source: Arc<dyn RateSource>,
    snapshot: SnapshotStore,
    ttl: Duration,
    current: RwLock<Arc<RateTable>>,
}

impl RateTableService {
    /// Creates a service starting from an empty table.
    #[must_use]
    pub fn new(source: Arc<dyn RateSource>, snapshot: SnapshotStore, ttl: Duration) -> Self {
        Self {
            source,
            snapshot,
            ttl,
            current: RwLock::new(Arc::new(RateTable::empty())),
        }
    }

    /// Creates an HTTP-backed service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &RatesConfig) -> RatesResult<Self> {
        let source = HttpRateSource::new(&config.url, Duration::from_millis(config.timeout_ms))?;
        Ok(Self::new(
            Arc::new(source),
            SnapshotStore::new(&config.snapshot_path),
            config.ttl(),
        ))
    }

    /// The table currently in use.
    #[must_use]
    pub fn current(&self) -> Arc<RateTable> {
        Arc::clone(&self.current.read())
    }

    /// A converter over the current table.
    #[must_use]
    pub fn converter(&self) -> CurrencyConverter {
        CurrencyConverter::from_shared(self.current())
    }

    fn is_fresh(&self, table: &RateTable) -> bool {
        !table.is_empty() && !table.fetched_at().is_older_than(self.ttl)
    }

    fn install(&self, table: RateTable) -> Arc<RateTable> {
        let table = Arc::new(table);
        *self.current.write() = Arc::clone(&table);
        table
    }

    /// Brings the table up to date and returns it. Never fails.
    pub async fn refresh(&self) -> Arc<RateTable> {
        let current = self.current();
        if self.is_fresh(&current) {
            return current;
        }

        let snapshot = match self.snapshot.load().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %self.snapshot.path().display(), error = %e, "unreadable rate snapshot");
                None
            }
        };
        if let Some(table) = snapshot.as_ref().filter(|t| self.is_fresh(t)) {
            debug!(currencies = table.len(), "using rate snapshot");
            return self.install(table.clone());
        }

        match self.source.fetch().await {
            Ok(table) if !table.is_empty() => {
                info!(currencies = table.len(), "exchange rates refreshed");
                if let Err(e) = self.snapshot.save(&table).await {
                    warn!(error = %e, "failed to persist rate snapshot");
                }
                self.install(table)
            }
            outcome => {
                match outcome {
                    Err(e) => warn!(error = %e, "exchange rate refresh failed"),
                    Ok(_) => warn!("exchange rate source returned no rates"),
                }
                if !current.is_empty() {
                    return current;
                }
                match snapshot {
                    Some(stale) if !stale.is_empty() => {
                        warn!(fetched_at = %stale.fetched_at(), "falling back to stale rate snapshot");
                        self.install(stale)
                    }
                    _ => current,
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{CurrencyCode, Timestamp};
    use crate::infrastructure::rates::error::RatesError;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct StubSource {
        result: RatesResult<RateTable>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(result: RatesResult<RateTable>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RateSource for StubSource {
        async fn fetch(&self) -> RatesResult<RateTable> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn table(rub: i64, fetched_at: Timestamp) -> RateTable {
        RateTable::empty()
            .with_rate(CurrencyCode::new("RUB"), Decimal::new(rub, 0))
            .with_fetched_at(fetched_at)
    }

    const DAY: Duration = Duration::from_secs(86_400);

    #[tokio::test]
    async fn fetches_when_nothing_cached_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotStore::new(dir.path().join("rates.json"));
        let source = StubSource::new(Ok(table(90, Timestamp::now())));
        let service = RateTableService::new(source.clone(), snapshot.clone(), DAY);

        let current = service.refresh().await;
        assert_eq!(current.get(&CurrencyCode::new("RUB")), Some(Decimal::new(90, 0)));
        assert!(snapshot.load().await.unwrap().is_some());

        service.refresh().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fresh_snapshot_avoids_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotStore::new(dir.path().join("rates.json"));
        snapshot.save(&table(80, Timestamp::now())).await.unwrap();

        let source = StubSource::new(Ok(table(90, Timestamp::now())));
        let service = RateTableService::new(source.clone(), snapshot, DAY);

        let current = service.refresh().await;
        assert_eq!(current.get(&CurrencyCode::new("RUB")), Some(Decimal::new(80, 0)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_fetch_falls_back_to_stale_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotStore::new(dir.path().join("rates.json"));
        let stale = Timestamp::now().sub_secs(3 * 86_400);
        snapshot.save(&table(70, stale)).await.unwrap();

        let source = StubSource::new(Err(RatesError::request("offline")));
        let service = RateTableService::new(source.clone(), snapshot, DAY);

        let converter = {
            service.refresh().await;
            service.converter()
        };
        assert_eq!(converter.rate_for(&CurrencyCode::new("RUB")), Decimal::new(70, 0));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_without_snapshot_yields_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotStore::new(dir.path().join("rates.json"));
        let source = StubSource::new(Err(RatesError::request("offline")));
        let service = RateTableService::new(source, snapshot, DAY);

        assert!(service.refresh().await.is_empty());
        assert_eq!(service.converter().rate_for(&CurrencyCode::new("RUB")), Decimal::ONE);
    }
}
