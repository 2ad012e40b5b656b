//! # Sources
//!
//! Per-locale price sources behind the [`SourceProbe`] port.

pub mod error;
pub mod store_listing;
pub mod traits;

pub use error::{ProbeError, ProbeResult};
pub use store_listing::{SourceConfig, SourceConfigError, StoreListingProbe};
pub use traits::SourceProbe;
