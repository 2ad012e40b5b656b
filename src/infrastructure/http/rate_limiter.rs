//! # Rate Limiter
//!
//! Global token-bucket limiter gating every outbound request.
//!
//! The bucket starts full and refills continuously at `capacity / period`,
//! never exceeding `capacity`. Each admission consumes one token. All
//! bucket state lives behind a single lock; a waiting caller computes its
//! deficit under the lock, releases it, sleeps, and tries again.
//!
//! Time is read from [`tokio::time::Instant`] so a paused test clock drives
//! the limiter deterministically.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Default admissions per period.
pub const DEFAULT_CAPACITY: u32 = 10;

/// Default refill period in milliseconds.
pub const DEFAULT_PERIOD_MS: u64 = 1_000;

/// Shortest wait the limiter will schedule.
const MIN_WAIT: Duration = Duration::from_millis(1);

/// Rate limiter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum burst, and admissions per period at steady state.
    pub capacity: u32,
    /// Refill period in milliseconds.
    pub period_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            period_ms: DEFAULT_PERIOD_MS,
        }
    }
}

impl RateLimitConfig {
    /// Sets the capacity.
    #[must_use]
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the refill period.
    #[must_use]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Refill period as a duration.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

/// Returned when a wait for admission is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rate limiter wait cancelled")]
pub struct AdmissionCancelled;

#[derive(Debug)]
struct TokenBucket {
    capacity: f64,
    refill_per_second: f64,
    allowance: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: u32, period: Duration, now: Instant) -> Self {
        let capacity = f64::from(capacity.max(1));
        let period = period.max(MIN_WAIT).as_secs_f64();
        Self {
            capacity,
            refill_per_second: capacity / period,
            allowance: capacity,
            last_refill: now,
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.allowance = (self.allowance + elapsed * self.refill_per_second).min(self.capacity);
        self.last_refill = self.last_refill.max(now);
    }

    /// Consumes one token, or reports how long until one is available.
    fn try_consume(&mut self, now: Instant) -> Result<(), Duration> {
        self.refill(now);

        if self.allowance >= 1.0 {
            self.allowance -= 1.0;
            return Ok(());
        }

        let deficit = 1.0 - self.allowance;
        let wait = Duration::try_from_secs_f64(deficit / self.refill_per_second)
            .unwrap_or(Duration::from_secs(1));
        Err(wait.max(MIN_WAIT))
    }

    fn available(&mut self, now: Instant) -> f64 {
        self.refill(now);
        self.allowance
    }
}

/// Token-bucket rate limiter shared by every fetch.
///
/// # Examples
///
/// ```
/// use regional_price_scan::infrastructure::http::rate_limiter::RateLimiter;
/// use std::time::Duration;
///
/// let limiter = RateLimiter::new(2, Duration::from_secs(1));
/// assert!(limiter.try_admit());
/// assert!(limiter.try_admit());
/// assert!(!limiter.try_admit());
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Mutex<TokenBucket>,
}

impl RateLimiter {
    /// Creates a limiter admitting `capacity` requests per `period`.
    ///
    /// A zero capacity is treated as one.
    #[must_use]
    pub fn new(capacity: u32, period: Duration) -> Self {
        Self {
            bucket: Mutex::new(TokenBucket::new(capacity, period, Instant::now())),
        }
    }

    /// Creates a limiter from configuration.
    #[must_use]
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.capacity, config.period())
    }

    /// Waits until a token is available, then consumes it.
    pub async fn admit(&self) {
        loop {
            let outcome = self.bucket.lock().try_consume(Instant::now());
            match outcome {
                Ok(()) => return,
                Err(wait) => tokio::time::sleep(wait).await,
            }
        }
    }

    /// Like [`admit`](Self::admit), but gives up when `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionCancelled`] if the token is cancelled before a
    /// unit becomes available.
    pub async fn admit_or_cancel(
        &self,
        cancel: &CancellationToken,
    ) -> Result<(), AdmissionCancelled> {
        loop {
            if cancel.is_cancelled() {
                return Err(AdmissionCancelled);
            }

            let outcome = self.bucket.lock().try_consume(Instant::now());
            let wait = match outcome {
                Ok(()) => return Ok(()),
                Err(wait) => wait,
            };

            tokio::select! {
                () = cancel.cancelled() => return Err(AdmissionCancelled),
                () = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Consumes a token if one is available right now.
    #[must_use]
    pub fn try_admit(&self) -> bool {
        self.bucket.lock().try_consume(Instant::now()).is_ok()
    }

    /// Tokens currently available, fractional.
    #[must_use]
    pub fn available(&self) -> f64 {
        self.bucket.lock().available(Instant::now())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    /// Every pair of admissions `i <= j` satisfies the token-bucket bound
    /// `j - i + 1 <= capacity + rate * (t_j - t_i)`.
    fn assert_bucket_bound(admitted: &[Instant], capacity: u32, period: Duration) {
        let rate = f64::from(capacity) / period.as_secs_f64();
        for i in 0..admitted.len() {
            for j in i..admitted.len() {
                let count = (j - i + 1) as f64;
                let window = admitted[j].duration_since(admitted[i]).as_secs_f64();
                let bound = f64::from(capacity) + rate * window + 1e-6;
                assert!(
                    count <= bound,
                    "{count} admissions in {window}s exceeds bound {bound}"
                );
            }
        }
    }

    #[test]
    fn starts_full_and_drains() {
        let limiter = RateLimiter::new(3, Duration::from_secs(1));
        assert!((limiter.available() - 3.0).abs() < 1e-9);
        assert!(limiter.try_admit());
        assert!(limiter.try_admit());
        assert!(limiter.try_admit());
        assert!(!limiter.try_admit());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let limiter = RateLimiter::new(0, Duration::ZERO);
        assert!(limiter.try_admit());
    }

    #[test]
    fn bucket_reports_deficit_wait() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(10, Duration::from_secs(1), start);
        for _ in 0..10 {
            assert!(bucket.try_consume(start).is_ok());
        }

        let wait = bucket.try_consume(start).unwrap_err();
        assert!(wait >= Duration::from_millis(99) && wait <= Duration::from_millis(101));

        assert!(bucket.try_consume(start + Duration::from_millis(101)).is_ok());
    }

    #[test]
    fn allowance_never_exceeds_capacity() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(4, Duration::from_secs(1), start);
        let later = start + Duration::from_secs(60);
        assert!((bucket.available(later) - 4.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_admissions_respect_bound() {
        let capacity = 5;
        let period = Duration::from_secs(1);
        let limiter = Arc::new(RateLimiter::new(capacity, period));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter.admit().await;
                Instant::now()
            }));
        }

        let mut admitted = Vec::new();
        for handle in handles {
            admitted.push(handle.await.unwrap());
        }
        admitted.sort();

        assert_eq!(admitted.iter().filter(|t| **t == start).count(), 5);
        assert!(admitted[19].duration_since(start) >= Duration::from_millis(2_990));
        assert_bucket_bound(&admitted, capacity, period);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_wait_returns_error() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.try_admit());

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        assert_eq!(
            limiter.admit_or_cancel(&cancel).await,
            Err(AdmissionCancelled)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn admit_or_cancel_succeeds_after_refill() {
        let limiter = RateLimiter::new(1, Duration::from_secs(1));
        let cancel = CancellationToken::new();
        let start = Instant::now();

        limiter.admit_or_cancel(&cancel).await.unwrap();
        limiter.admit_or_cancel(&cancel).await.unwrap();

        assert!(Instant::now().duration_since(start) >= Duration::from_millis(999));
    }

    proptest! {
        #[test]
        fn simulated_arrivals_never_exceed_bucket_bound(
            capacity in 1u32..12,
            period_ms in 100u64..3_000,
            gaps in proptest::collection::vec(0u64..400, 1..120),
        ) {
            let period = Duration::from_millis(period_ms);
            let start = Instant::now();
            let mut bucket = TokenBucket::new(capacity, period, start);

            let mut now = start;
            let mut admitted = Vec::new();
            for gap in gaps {
                now += Duration::from_millis(gap);
                if bucket.try_consume(now).is_ok() {
                    admitted.push(now);
                }
            }

            let burst = admitted.iter().filter(|t| **t == admitted[0]).count();
            prop_assert!(burst <= capacity as usize);
            assert_bucket_bound(&admitted, capacity, period);
        }
    }
}
