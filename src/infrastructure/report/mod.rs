//! # Reports
//!
//! Sinks that persist a finished aggregation and hand back an artifact.

pub mod csv_sink;
pub mod error;
pub mod traits;

pub use csv_sink::{CsvReportSink, ReportConfig};
pub use error::{ReportError, ReportResult};
pub use traits::ReportSink;
