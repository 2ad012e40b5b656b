//! # Currency Code
//!
//! ISO-4217 style currency identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency every observation is normalized into.
pub const BASE_CURRENCY: &str = "USD";

/// An upper-case currency code such as `USD` or `IDR`.
///
/// Codes are normalized to upper case on construction so that rate tables
/// keyed by lower-case codes (as the upstream rate document uses) and
/// locale tables keyed by upper-case codes agree.
///
/// # Examples
///
/// ```
/// use regional_price_scan::domain::value_objects::currency::CurrencyCode;
///
/// let code = CurrencyCode::new("eur");
/// assert_eq!(code.as_str(), "EUR");
/// assert!(CurrencyCode::base().is_base());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Creates a currency code, trimming and upper-casing the input.
    #[must_use]
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    /// The base currency (`USD`).
    #[must_use]
    pub fn base() -> Self {
        Self(BASE_CURRENCY.to_string())
    }

    /// Returns true if this is the base currency.
    #[must_use]
    pub fn is_base(&self) -> bool {
        self.0 == BASE_CURRENCY
    }

    /// Returns the code as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}
