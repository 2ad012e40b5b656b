//! # Application Layer
//!
//! Use cases orchestrating domain services and infrastructure ports.

pub mod error;
pub mod services;

pub use error::{AggregationError, ApplicationError, ApplicationResult};
