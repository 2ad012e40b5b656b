//! # HTTP
//!
//! Outbound HTTP plumbing: a single global [`RateLimiter`], a one-attempt
//! [`HttpTransport`] port with its `reqwest` adapter, and the
//! [`RetryingFetcher`] that combines them.

pub mod error;
pub mod http_client;
pub mod rate_limiter;
pub mod retry;

pub use error::{FetchError, FetchResult};
pub use http_client::{HttpConfig, HttpResponse, HttpTransport, ReqwestTransport};
pub use rate_limiter::{AdmissionCancelled, RateLimitConfig, RateLimiter};
pub use retry::{FetchOutcome, RetryPolicy, RetryingFetcher};
