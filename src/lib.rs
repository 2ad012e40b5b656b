//! # regional-price-scan
//!
//! Collects one price observation per country for a store item, normalizes
//! the localized price strings, converts them to USD and writes a sorted
//! report.
//!
//! # Architecture
//!
//! ```text
//! application   PriceReportService ─► BatchAggregator ─► SourceProbe
//!                       │                   │
//! domain                │        PriceStringParser, CurrencyConverter
//!                       ▼                   ▼
//! infrastructure  ResultCache   RetryingFetcher ─► RateLimiter ─► HttpTransport
//!                 ReportSink    RateTableService
//! ```
//!
//! # Example
//!
//! ```no_run
//! use regional_price_scan::application::services::PriceReportService;
//! use regional_price_scan::config::AppConfig;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = AppConfig::load(None)?;
//! let service = PriceReportService::from_config(&config)?;
//! let outcome = service
//!     .generate("cli", "com.example.app", &CancellationToken::new())
//!     .await?;
//! println!("report written to {}", outcome.artifact);
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;
