//! # Application Services
//!
//! - [`BatchAggregator`]: bounded-parallel, batched locale probing
//! - [`PriceReportService`]: quota, cache, aggregation and reporting
//! - [`CallerQuota`]: per-caller request quota
//! - [`ProgressReporter`]: per-batch progress hook

pub mod batch_aggregation;
pub mod caller_quota;
pub mod price_report;
pub mod progress;

pub use batch_aggregation::{AggregationConfig, BatchAggregator, LocaleFailure};
pub use caller_quota::{CallerQuota, QuotaConfig};
pub use price_report::{PriceReportService, ReportOutcome, ServiceStatus};
pub use progress::{BatchProgress, ProgressReporter, TracingProgressReporter};
