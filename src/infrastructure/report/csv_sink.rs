//! # CSV Report Sink
//!
//! Writes one CSV file per run into a report directory and prunes files
//! older than the configured age afterwards.
//!
//! Files are named `<item>_<store>_<YYYYmmdd_HHMMSS>.csv` and carry the
//! columns `Min Price (USD)`, `Max Price (USD)`, `Max Price (<report>)`,
//! `Country`, `Currency`, `Original Price Range`.

use crate::domain::entities::AggregationResult;
use crate::domain::value_objects::{BASE_CURRENCY, CurrencyCode, Timestamp};
use crate::infrastructure::cache::artifact::ArtifactRef;
use crate::infrastructure::report::error::{ReportError, ReportResult};
use crate::infrastructure::report::traits::ReportSink;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Report configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output directory.
    pub dir: PathBuf,
    /// Reports older than this many hours are removed after each write.
    pub max_age_hours: u64,
    /// Currency of the secondary price column.
    pub currency: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./data"),
            max_age_hours: 72,
            currency: "RUB".to_string(),
        }
    }
}

impl ReportConfig {
    /// Sets the output directory.
    #[must_use]
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Sets the report currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Report currency as a code.
    #[must_use]
    pub fn currency_code(&self) -> CurrencyCode {
        CurrencyCode::new(&self.currency)
    }

    /// Maximum report age.
    #[must_use]
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_hours.saturating_mul(3_600))
    }
}

/// Writes CSV reports to a directory.
#[derive(Debug, Clone)]
pub struct CsvReportSink {
    dir: PathBuf,
    max_age: Duration,
    report_currency: CurrencyCode,
}

impl CsvReportSink {
    /// Creates a sink.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, max_age: Duration, report_currency: CurrencyCode) -> Self {
        Self {
            dir: dir.into(),
            max_age,
            report_currency,
        }
    }

    /// Creates a sink from configuration.
    #[must_use]
    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(&config.dir, config.max_age(), config.currency_code())
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Renders the CSV document.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be encoded.
    pub fn render(&self, result: &AggregationResult) -> ReportResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            format!("Min Price ({BASE_CURRENCY})"),
            format!("Max Price ({BASE_CURRENCY})"),
            format!("Max Price ({})", self.report_currency),
            "Country".to_string(),
            "Currency".to_string(),
            "Original Price Range".to_string(),
        ])?;

        for observation in result.observations() {
            writer.write_record([
                format!("{:.2}", observation.min_usd()),
                format!("{:.2}", observation.max_usd()),
                format!("{:.2}", observation.max_report_amount()),
                observation.locale().country().to_string(),
                observation.currency().to_string(),
                observation.raw().to_string(),
            ])?;
        }

        writer
            .into_inner()
            .map_err(|e| ReportError::encode(e.to_string()))
    }

    fn file_name(result: &AggregationResult, store: &str, now: Timestamp) -> String {
        format!("{}_{}_{}.csv", result.item(), store, now.to_file_stamp())
    }

    /// Removes `.csv` files older than the configured age, except `keep`.
    ///
    /// Returns the number of files removed. Individual failures are logged
    /// and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed.
    pub async fn cleanup(&self, keep: &Path) -> ReportResult<usize> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path == keep || path.extension().is_none_or(|ext| ext != "csv") {
                continue;
            }
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            if !Timestamp::from(modified).is_older_than(self.max_age) {
                continue;
            }

            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    info!(path = %path.display(), "removed expired report");
                    removed += 1;
                }
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove expired report"),
            }
        }

        Ok(removed)
    }
}

#[async_trait]
impl ReportSink for CsvReportSink {
    async fn write(&self, result: &AggregationResult, store: &str) -> ReportResult<ArtifactRef> {
        let contents = self.render(result)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(Self::file_name(result, store, Timestamp::now()));
        tokio::fs::write(&path, contents).await?;
        info!(path = %path.display(), rows = result.succeeded(), "report written");

        if let Err(e) = self.cleanup(&path).await {
            warn!(dir = %self.dir.display(), error = %e, "report cleanup failed");
        }

        Ok(ArtifactRef::new(path))
    }
}
