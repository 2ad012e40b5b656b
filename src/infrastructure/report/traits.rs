//! # Report Sink Trait

use crate::domain::entities::AggregationResult;
use crate::infrastructure::cache::artifact::ArtifactRef;
use crate::infrastructure::report::error::ReportResult;
use async_trait::async_trait;

/// Receives a finished aggregation and stores it somewhere.
#[async_trait]
pub trait ReportSink: Send + Sync + std::fmt::Debug {
    /// Writes the report and returns a handle to it.
    ///
    /// Rows appear in the order of `result.observations()`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`](super::error::ReportError) if the report
    /// cannot be produced.
    async fn write(&self, result: &AggregationResult, store: &str) -> ReportResult<ArtifactRef>;
}
