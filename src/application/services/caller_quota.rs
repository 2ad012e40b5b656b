//! # Caller Quota
//!
//! Per-caller request quota in front of report generation.
//!
//! Backed by a keyed GCRA limiter: a caller may burst up to `max_requests`
//! and then regains one request every `period / max_requests`.

use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

/// Quota configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Whether the quota is enforced.
    pub enabled: bool,
    /// Requests allowed per period.
    pub max_requests: u32,
    /// Period in seconds.
    pub period_secs: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 5,
            period_secs: 60,
        }
    }
}

impl QuotaConfig {
    /// Sets the allowance.
    #[must_use]
    pub fn with_limit(mut self, max_requests: u32, period: Duration) -> Self {
        self.max_requests = max_requests;
        self.period_secs = period.as_secs();
        self
    }

    /// Enables or disables the quota.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    fn quota(&self) -> Quota {
        let burst = NonZeroU32::new(self.max_requests).unwrap_or(NonZeroU32::MIN);
        let interval = (Duration::from_secs(self.period_secs) / burst.get())
            .max(Duration::from_millis(1));
        Quota::with_period(interval)
            .map(|quota| quota.allow_burst(burst))
            .unwrap_or_else(|| Quota::per_minute(burst))
    }
}

/// Keyed request quota.
pub struct CallerQuota {
    limiter: DefaultKeyedRateLimiter<String>,
    clock: DefaultClock,
}

impl fmt::Debug for CallerQuota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallerQuota")
            .field("tracked_callers", &self.tracked_callers())
            .finish_non_exhaustive()
    }
}

impl CallerQuota {
    /// Creates a quota from configuration.
    #[must_use]
    pub fn new(config: &QuotaConfig) -> Self {
        Self {
            limiter: RateLimiter::keyed(config.quota()),
            clock: DefaultClock::default(),
        }
    }

    /// Records a request from `caller`.
    ///
    /// # Errors
    ///
    /// Returns how long the caller must wait if the quota is used up.
    pub fn check(&self, caller: &str) -> Result<(), Duration> {
        self.limiter
            .check_key(&caller.to_string())
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    /// Forgets callers whose allowance is fully restored.
    pub fn prune(&self) {
        self.limiter.retain_recent();
    }

    /// Number of tracked callers.
    #[must_use]
    pub fn tracked_callers(&self) -> usize {
        self.limiter.len()
    }
}
