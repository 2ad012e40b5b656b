//! # Domain Entities

pub mod aggregation;
pub mod observation;

pub use aggregation::{AggregationResult, FailureKind, LocaleFailureRecord};
pub use observation::{PriceObservation, PriceRange};
