//! # Timestamp Value Object
//!
//! Wall-clock UTC timestamp used for rate snapshots and report file names.
//!
//! Monotonic concerns (rate limiting, cache expiry) use `tokio::time::Instant`
//! instead; this type is only for values that are persisted or displayed.
//!
//! # Examples
//!
//! ```
//! use regional_price_scan::domain::value_objects::timestamp::Timestamp;
//!
//! let earlier = Timestamp::from_secs(1_704_067_200).unwrap();
//! let later = earlier.add_secs(60);
//!
//! assert!(later.is_after(&earlier));
//! assert_eq!(earlier.to_file_stamp(), "20240101_000000");
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;

/// A UTC timestamp.
///
/// Wraps `chrono::DateTime<Utc>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Compact format used in report file names: `YYYYmmdd_HHMMSS`.
    pub const FILE_STAMP_FORMAT: &'static str = "%Y%m%d_%H%M%S";

    /// Creates a timestamp for the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from Unix seconds.
    ///
    /// Returns `None` if the value is out of range.
    #[must_use]
    pub fn from_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Creates a timestamp from Unix milliseconds.
    ///
    /// Returns `None` if the value is out of range.
    #[must_use]
    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Returns the Unix timestamp in seconds.
    #[inline]
    #[must_use]
    pub fn timestamp_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Adds seconds to the timestamp (negative values move it back).
    #[must_use]
    pub fn add_secs(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }

    /// Subtracts seconds from the timestamp.
    #[must_use]
    pub fn sub_secs(&self, secs: i64) -> Self {
        Self(self.0 - Duration::seconds(secs))
    }

    /// Returns true if this timestamp is after another.
    #[inline]
    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self.0 > other.0
    }

    /// Time elapsed since this timestamp. Zero for timestamps in the future.
    #[must_use]
    pub fn age(&self) -> std::time::Duration {
        Self::now() - *self
    }

    /// Returns true if more than `max_age` has elapsed since this timestamp.
    ///
    /// # Examples
    ///
    /// ```
    /// use regional_price_scan::domain::value_objects::timestamp::Timestamp;
    /// use std::time::Duration;
    ///
    /// let day_old = Timestamp::now().sub_secs(86_400 + 5);
    /// assert!(day_old.is_older_than(Duration::from_secs(86_400)));
    /// assert!(!Timestamp::now().is_older_than(Duration::from_secs(60)));
    /// ```
    #[must_use]
    pub fn is_older_than(&self, max_age: std::time::Duration) -> bool {
        self.age() >= max_age
    }

    /// Formats the timestamp for use in file names.
    #[must_use]
    pub fn to_file_stamp(&self) -> String {
        self.0.format(Self::FILE_STAMP_FORMAT).to_string()
    }

    /// Returns the underlying DateTime.
    #[inline]
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<std::time::SystemTime> for Timestamp {
    fn from(time: std::time::SystemTime) -> Self {
        Self(DateTime::<Utc>::from(time))
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = std::time::Duration;

    fn sub(self, rhs: Timestamp) -> Self::Output {
        (self.0 - rhs.0)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }
}
