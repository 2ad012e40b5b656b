//! # Price Observation
//!
//! One normalized price sample for one locale.

use crate::domain::value_objects::{CurrencyCode, Locale};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower and upper bound of a parsed price string, in the source currency.
///
/// A single price is represented as `min == max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lower bound.
    pub min: Decimal,
    /// Upper bound.
    pub max: Decimal,
}

impl PriceRange {
    /// Creates a range from two bounds.
    #[must_use]
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Creates a degenerate range for a single price.
    #[must_use]
    pub fn single(price: Decimal) -> Self {
        Self {
            min: price,
            max: price,
        }
    }
}

/// A price observed for one locale, converted into the base currency.
///
/// Created once per successful probe and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    locale: Locale,
    raw: String,
    min_usd: Decimal,
    max_usd: Decimal,
    report_currency: CurrencyCode,
    max_report_amount: Decimal,
}

impl PriceObservation {
    /// Creates an observation.
    ///
    /// # Arguments
    ///
    /// * `locale` - The locale the price was observed in
    /// * `raw` - The price string exactly as extracted from the source
    /// * `min_usd` / `max_usd` - Bounds converted to the base currency
    /// * `report_currency` - Currency of the secondary report column
    /// * `max_report_amount` - `max_usd` expressed in `report_currency`
    #[must_use]
    pub fn new(
        locale: Locale,
        raw: impl Into<String>,
        min_usd: Decimal,
        max_usd: Decimal,
        report_currency: CurrencyCode,
        max_report_amount: Decimal,
    ) -> Self {
        Self {
            locale,
            raw: raw.into(),
            min_usd,
            max_usd,
            report_currency,
            max_report_amount,
        }
    }

    /// The locale this observation belongs to.
    #[inline]
    #[must_use]
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// The source currency of the raw string.
    #[inline]
    #[must_use]
    pub fn currency(&self) -> &CurrencyCode {
        self.locale.currency()
    }

    /// The raw price string.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Lower bound in the base currency.
    #[inline]
    #[must_use]
    pub fn min_usd(&self) -> Decimal {
        self.min_usd
    }

    /// Upper bound in the base currency. Results are ordered by this value.
    #[inline]
    #[must_use]
    pub fn max_usd(&self) -> Decimal {
        self.max_usd
    }

    /// Currency of [`Self::max_report_amount`].
    #[inline]
    #[must_use]
    pub fn report_currency(&self) -> &CurrencyCode {
        &self.report_currency
    }

    /// Upper bound converted into the report currency.
    #[inline]
    #[must_use]
    pub fn max_report_amount(&self) -> Decimal {
        self.max_report_amount
    }
}

impl fmt::Display for PriceObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}..{} USD ({:?})",
            self.locale, self.min_usd, self.max_usd, self.raw
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::CountryCode;

    #[test]
    fn accessors_expose_constructor_values() {
        let locale = Locale::new(CountryCode::new("ID"), CurrencyCode::new("IDR"));
        let observation = PriceObservation::new(
            locale.clone(),
            "Rp 15.000 - Rp 150.000 per item",
            Decimal::new(96, 2),
            Decimal::new(959, 2),
            CurrencyCode::new("RUB"),
            Decimal::new(88338, 2),
        );

        assert_eq!(observation.locale(), &locale);
        assert_eq!(observation.currency().as_str(), "IDR");
        assert_eq!(observation.max_usd(), Decimal::new(959, 2));
        assert_eq!(observation.report_currency().as_str(), "RUB");
        assert!(observation.to_string().starts_with("ID/IDR 0.96..9.59 USD"));
    }

    #[test]
    fn single_price_range() {
        let range = PriceRange::single(Decimal::new(199, 2));
        assert_eq!(range.min, range.max);
    }
}
