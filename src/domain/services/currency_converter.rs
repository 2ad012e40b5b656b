//! # Currency Converter
//!
//! Converts source-currency amounts into the base currency (USD) using a
//! snapshot of exchange rates.
//!
//! Rates are expressed as *units of currency per one USD*, the shape of the
//! upstream rate document. A currency with no rate, or a zero rate, is
//! treated as if it were already USD-denominated (rate `1.0`). This is a
//! deliberate approximation: an unknown currency degrades one row of the
//! report instead of failing the run.

use crate::domain::value_objects::money::{round_cents, round_cents_floored};
use crate::domain::value_objects::{CurrencyCode, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Exchange rates against USD at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    rates: HashMap<CurrencyCode, Decimal>,
    fetched_at: Timestamp,
}

impl RateTable {
    /// Creates a rate table.
    #[must_use]
    pub fn new(rates: HashMap<CurrencyCode, Decimal>, fetched_at: Timestamp) -> Self {
        Self { rates, fetched_at }
    }

    /// A table with no rates, as used before the first successful refresh.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rates: HashMap::new(),
            fetched_at: Timestamp::from_secs(0).unwrap_or_default(),
        }
    }

    /// Adds a single rate.
    #[must_use]
    pub fn with_rate(mut self, currency: CurrencyCode, units_per_usd: Decimal) -> Self {
        self.rates.insert(currency, units_per_usd);
        self
    }

    /// Sets the retrieval time.
    #[must_use]
    pub fn with_fetched_at(mut self, fetched_at: Timestamp) -> Self {
        self.fetched_at = fetched_at;
        self
    }

    /// Raw rate lookup, `None` if the currency is absent.
    #[must_use]
    pub fn get(&self, currency: &CurrencyCode) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }

    /// When the rates were obtained from the upstream source.
    #[inline]
    #[must_use]
    pub fn fetched_at(&self) -> Timestamp {
        self.fetched_at
    }

    /// Number of currencies in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Returns true if the table has no rates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::empty()
    }
}

/// Converts amounts between a source currency and USD.
///
/// Cheap to clone; the underlying table is shared.
///
/// # Examples
///
/// ```
/// use regional_price_scan::domain::services::currency_converter::{CurrencyConverter, RateTable};
/// use regional_price_scan::domain::value_objects::CurrencyCode;
/// use rust_decimal::Decimal;
///
/// let table = RateTable::empty().with_rate(CurrencyCode::new("JPY"), Decimal::new(150, 0));
/// let converter = CurrencyConverter::new(table);
///
/// let usd = converter.to_reference(Decimal::new(1500, 0), &CurrencyCode::new("JPY"));
/// assert_eq!(usd, Decimal::new(1000, 2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CurrencyConverter {
    table: Arc<RateTable>,
}

impl CurrencyConverter {
    /// Creates a converter over a rate table.
    #[must_use]
    pub fn new(table: RateTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    /// Creates a converter sharing an existing table.
    #[must_use]
    pub fn from_shared(table: Arc<RateTable>) -> Self {
        Self { table }
    }

    /// Units of `currency` per USD, defaulting to `1` when unknown or zero.
    #[must_use]
    pub fn rate_for(&self, currency: &CurrencyCode) -> Decimal {
        match self.table.get(currency) {
            Some(rate) if rate > Decimal::ZERO => rate,
            _ => Decimal::ONE,
        }
    }

    /// Converts an amount in `currency` to USD.
    ///
    /// The result is rounded half away from zero to cents and never drops
    /// below `0.01`.
    #[must_use]
    pub fn to_reference(&self, amount: Decimal, currency: &CurrencyCode) -> Decimal {
        let rate = self.rate_for(currency);
        // Saturate instead of failing; only reachable with absurd inputs.
        let converted = amount.checked_div(rate).unwrap_or(Decimal::MAX);
        round_cents_floored(converted)
    }

    /// Converts a USD amount into `currency`, rounded to cents.
    #[must_use]
    pub fn from_reference(&self, amount_usd: Decimal, currency: &CurrencyCode) -> Decimal {
        let rate = self.rate_for(currency);
        round_cents(amount_usd.checked_mul(rate).unwrap_or(Decimal::MAX))
    }

    /// The rate table in use.
    #[must_use]
    pub fn table(&self) -> &RateTable {
        &self.table
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn converter() -> CurrencyConverter {
        CurrencyConverter::new(
            RateTable::empty()
                .with_rate(CurrencyCode::new("IDR"), dec("15646.73"))
                .with_rate(CurrencyCode::new("RUB"), dec("92.12"))
                .with_rate(CurrencyCode::new("KWD"), dec("0.308"))
                .with_rate(CurrencyCode::new("ZZZ"), Decimal::ZERO),
        )
    }

    #[test]
    fn divides_by_units_per_usd() {
        let converter = converter();
        assert_eq!(
            converter.to_reference(dec("150000"), &CurrencyCode::new("IDR")),
            dec("9.59")
        );
        assert_eq!(
            converter.to_reference(dec("1"), &CurrencyCode::new("KWD")),
            dec("3.25")
        );
    }

    #[test]
    fn unknown_and_zero_rates_default_to_one() {
        let converter = converter();
        assert_eq!(converter.rate_for(&CurrencyCode::new("XYZ")), Decimal::ONE);
        assert_eq!(converter.rate_for(&CurrencyCode::new("ZZZ")), Decimal::ONE);
        assert_eq!(
            converter.to_reference(dec("4.995"), &CurrencyCode::new("XYZ")),
            dec("5.00")
        );
    }

    #[test]
    fn floors_at_one_cent() {
        let converter = converter();
        assert_eq!(
            converter.to_reference(dec("1"), &CurrencyCode::new("IDR")),
            dec("0.01")
        );
        assert_eq!(
            converter.to_reference(Decimal::ZERO, &CurrencyCode::new("USD")),
            dec("0.01")
        );
    }

    #[test]
    fn from_reference_multiplies() {
        let converter = converter();
        assert_eq!(
            converter.from_reference(dec("9.59"), &CurrencyCode::new("RUB")),
            dec("883.43")
        );
    }

    proptest! {
        #[test]
        fn to_reference_is_monotonic(a in 0i64..1_000_000_000, b in 0i64..1_000_000_000) {
            let converter = converter();
            let idr = CurrencyCode::new("IDR");
            let (low, high) = if a <= b { (a, b) } else { (b, a) };

            let low_usd = converter.to_reference(Decimal::new(low, 2), &idr);
            let high_usd = converter.to_reference(Decimal::new(high, 2), &idr);
            prop_assert!(low_usd <= high_usd);
        }

        #[test]
        fn unknown_currency_is_rounded_identity(cents in 0i64..1_000_000_000, extra in 0i64..10) {
            let converter = converter();
            let amount = Decimal::new(cents * 10 + extra, 3);
            let expected = round_cents_floored(amount);

            prop_assert_eq!(converter.to_reference(amount, &CurrencyCode::new("QQQ")), expected);
        }
    }
}
