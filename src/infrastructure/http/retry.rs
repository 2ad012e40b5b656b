//! # Retrying Fetcher
//!
//! Wraps an [`HttpTransport`] with rate-limited, retried GETs.
//!
//! Every attempt first waits for the shared [`RateLimiter`]. Transport
//! failures and non-2xx statuses are retried with exponential backoff
//! (`backoff_base * 2^attempt`); a `404` ends the fetch immediately with
//! [`FetchOutcome::NotFound`]. Both the limiter wait and the backoff sleep
//! observe the caller's cancellation token.

use crate::infrastructure::http::error::{FetchError, FetchResult};
use crate::infrastructure::http::http_client::HttpTransport;
use crate::infrastructure::http::rate_limiter::RateLimiter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Default number of attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default backoff base in milliseconds.
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1_500;

/// Retry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Backoff before the second attempt, doubled each time after.
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        }
    }
}

impl RetryPolicy {
    /// Sets the number of attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the backoff base.
    #[must_use]
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Attempts actually made; at least one.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay after the failed attempt with zero-based index `attempt`.
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        Duration::from_millis(self.backoff_base_ms).saturating_mul(factor)
    }
}

/// Outcome of a fetch that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A 2xx response.
    Success {
        /// Status code.
        status: u16,
        /// Response body.
        body: String,
    },
    /// The resource does not exist.
    NotFound,
}

/// Rate-limited GET with retry and backoff.
#[derive(Debug, Clone)]
pub struct RetryingFetcher {
    transport: Arc<dyn HttpTransport>,
    limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
}

impl RetryingFetcher {
    /// Creates a fetcher.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        limiter: Arc<RateLimiter>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            limiter,
            policy,
        }
    }

    /// The retry policy in use.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches `url`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Cancelled`] if `cancel` fires while waiting
    /// - [`FetchError::Exhausted`] once every attempt has failed
    /// - [`FetchError::Client`] for non-retryable transport errors
    pub async fn fetch(&self, url: &str, cancel: &CancellationToken) -> FetchResult<FetchOutcome> {
        let attempts = self.policy.attempts();
        let mut last = FetchError::transport("no attempt made");

        for attempt in 0..attempts {
            self.limiter
                .admit_or_cancel(cancel)
                .await
                .map_err(|_| FetchError::Cancelled)?;

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(FetchError::Cancelled),
                result = self.transport.get(url) => result,
            };

            let failure = match result {
                Ok(response) if response.is_success() => {
                    return Ok(FetchOutcome::Success {
                        status: response.status,
                        body: response.body,
                    });
                }
                Ok(response) if response.is_not_found() => {
                    debug!(url, "resource not found");
                    return Ok(FetchOutcome::NotFound);
                }
                Ok(response) => FetchError::status(response.status),
                Err(error) if !error.is_retryable() => return Err(error),
                Err(error) => error,
            };

            warn!(
                attempt = attempt + 1,
                max_attempts = attempts,
                url,
                error = %failure,
                "fetch attempt failed"
            );

            if attempt + 1 < attempts {
                let delay = self.policy.backoff_for(attempt);
                tokio::select! {
                    () = cancel.cancelled() => return Err(FetchError::Cancelled),
                    () = tokio::time::sleep(delay) => {}
                }
            }
            last = failure;
        }

        Err(FetchError::exhausted(attempts, last))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::infrastructure::http::http_client::HttpResponse;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    /// Transport replaying a script of responses; repeats the last one.
    #[derive(Debug)]
    pub(crate) struct ScriptedTransport {
        script: Mutex<VecDeque<FetchResult<HttpResponse>>>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        pub(crate) fn new(script: Vec<FetchResult<HttpResponse>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn get(&self, _url: &str) -> FetchResult<HttpResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap()
            }
        }
    }

    fn fetcher(transport: Arc<ScriptedTransport>) -> RetryingFetcher {
        RetryingFetcher::new(
            transport,
            Arc::new(RateLimiter::new(10, Duration::from_secs(1))),
            RetryPolicy::default(),
        )
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for(0), Duration::from_millis(1_500));
        assert_eq!(policy.backoff_for(1), Duration::from_millis(3_000));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(6_000));
        assert_eq!(RetryPolicy::default().with_max_attempts(0).attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn success_on_first_attempt() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(HttpResponse::new(
            200, "body",
        ))]));
        let outcome = fetcher(Arc::clone(&transport))
            .fetch("http://x", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            FetchOutcome::Success {
                status: 200,
                body: "body".to_string()
            }
        );
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_short_circuits() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(HttpResponse::new(404, ""))]));
        let outcome = fetcher(Arc::clone(&transport))
            .fetch("http://x", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome, FetchOutcome::NotFound);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_with_backoff_until_success() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(HttpResponse::new(503, "")),
            Err(FetchError::timeout("slow")),
            Ok(HttpResponse::new(200, "ok")),
        ]));
        let start = Instant::now();
        let outcome = fetcher(Arc::clone(&transport))
            .fetch("http://x", &CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(outcome, FetchOutcome::Success { .. }));
        assert_eq!(transport.calls(), 3);
        assert!(start.elapsed() >= Duration::from_millis(4_500));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_carries_last_failure() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(HttpResponse::new(500, ""))]));
        let start = Instant::now();
        let error = fetcher(Arc::clone(&transport))
            .fetch("http://x", &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(error.attempts(), Some(3));
        assert_eq!(error.last_status(), Some(500));
        assert_eq!(transport.calls(), 3);
        // no sleep after the final attempt
        assert!(start.elapsed() < Duration::from_millis(6_000));
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_is_returned_immediately() {
        let transport = Arc::new(ScriptedTransport::new(vec![Err(FetchError::client("tls"))]));
        let error = fetcher(Arc::clone(&transport))
            .fetch("http://x", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(error, FetchError::Client { .. }));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn each_attempt_consumes_a_limiter_token() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(HttpResponse::new(502, ""))]));
        let limiter = Arc::new(RateLimiter::new(3, Duration::from_secs(3_600)));
        let fetcher = RetryingFetcher::new(
            transport,
            Arc::clone(&limiter),
            RetryPolicy::default().with_backoff_base(Duration::from_millis(1)),
        );

        let _ = fetcher.fetch("http://x", &CancellationToken::new()).await;
        assert!(!limiter.try_admit());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_backoff() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(HttpResponse::new(503, ""))]));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let error = fetcher(Arc::clone(&transport))
            .fetch("http://x", &cancel)
            .await
            .unwrap_err();

        assert_eq!(error, FetchError::Cancelled);
        assert_eq!(transport.calls(), 1);
    }
}
