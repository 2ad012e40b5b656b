//! # Infrastructure Layer
//!
//! Adapters to the outside world: outbound HTTP, listing sources, exchange
//! rates, report files and the result cache.

pub mod cache;
pub mod http;
pub mod rates;
pub mod report;
pub mod sources;
