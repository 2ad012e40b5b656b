//! # Exchange Rates
//!
//! Retrieval, persistence and refresh policy for the USD rate table.

pub mod error;
pub mod service;
pub mod snapshot;
pub mod source;

pub use error::{RatesError, RatesResult};
pub use service::{RateTableService, RatesConfig};
pub use snapshot::SnapshotStore;
pub use source::{HttpRateSource, RateSource, parse_rate_document};
