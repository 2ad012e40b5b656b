//! # Source Probe Trait
//!
//! Port for per-locale price sources.
//!
//! A probe fetches one locale's view of an item and returns the raw,
//! unparsed price string. Parsing and conversion happen in the aggregator.
//!
//! # Examples
//!
//! ```ignore
//! use regional_price_scan::infrastructure::sources::{SourceProbe, ProbeResult};
//!
//! #[derive(Debug)]
//! struct FixedProbe;
//!
//! #[async_trait::async_trait]
//! impl SourceProbe for FixedProbe {
//!     fn store(&self) -> &str { "fixed" }
//!
//!     async fn probe(&self, _: &Locale, _: &ItemId, _: &CancellationToken) -> ProbeResult<String> {
//!         Ok("$1.00 per item".to_string())
//!     }
//! }
//! ```

use crate::domain::value_objects::{ItemId, Locale};
use crate::infrastructure::sources::error::ProbeResult;
use async_trait::async_trait;
use std::fmt::Debug;
use tokio_util::sync::CancellationToken;

/// A per-locale price source.
#[async_trait]
pub trait SourceProbe: Send + Sync + Debug {
    /// Short store name, used in cache keys and report file names.
    fn store(&self) -> &str;

    /// Fetches the raw price string for `item` as seen from `locale`.
    ///
    /// # Errors
    ///
    /// Returns a [`ProbeError`](super::error::ProbeError) describing why no
    /// price string could be obtained.
    async fn probe(
        &self,
        locale: &Locale,
        item: &ItemId,
        cancel: &CancellationToken,
    ) -> ProbeResult<String>;
}
