//! # Locales
//!
//! Country codes, their currencies, and the catalog of locales a run covers.
//!
//! The catalog is loaded once at startup and never mutated afterwards.
//! A country with no known currency is priced in the base currency.

use crate::domain::value_objects::currency::CurrencyCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Country → currency pairs known out of the box.
const DEFAULT_CURRENCIES: &[(&str, &str)] = &[
    ("DZ", "DZD"), ("AU", "AUD"), ("BH", "BHD"), ("BD", "BDT"), ("BO", "BOB"),
    ("BR", "BRL"), ("KH", "KHR"), ("CA", "CAD"), ("KY", "KYD"), ("CL", "CLP"),
    ("CO", "COP"), ("CR", "CRC"), ("EG", "EGP"), ("GE", "GEL"), ("GH", "GHS"),
    ("HK", "HKD"), ("IN", "INR"), ("ID", "IDR"), ("IQ", "IQD"), ("IL", "ILS"),
    ("JP", "JPY"), ("JO", "JOD"), ("KZ", "KZT"), ("KE", "KES"), ("KR", "KRW"),
    ("KW", "KWD"), ("MO", "MOP"), ("MY", "MYR"), ("MX", "MXN"), ("MA", "MAD"),
    ("MM", "MMK"), ("NZ", "NZD"), ("NG", "NGN"), ("OM", "OMR"), ("PK", "PKR"),
    ("PA", "PAB"), ("PY", "PYG"), ("PE", "PEN"), ("PH", "PHP"), ("QA", "QAR"),
    ("RU", "RUB"), ("SA", "SAR"), ("RS", "RSD"), ("SG", "SGD"), ("ZA", "ZAR"),
    ("LK", "LKR"), ("TW", "TWD"), ("TZ", "TZS"), ("TH", "THB"), ("TR", "TRY"),
    ("UA", "UAH"), ("AE", "AED"), ("US", "USD"), ("VN", "VND"),
];

/// Countries probed by default, in probe order.
const DEFAULT_COUNTRIES: &[&str] = &[
    "DZ", "EG", "AU", "BD", "BO", "BR", "CA", "CL", "CO", "CR", "GE", "GH", "HK", "IN", "ID",
    "IQ", "IL", "JP", "JO", "KZ", "KE", "KR", "MO", "MY", "MX", "MA", "MM", "NZ", "NG", "PK",
    "PY", "PE", "PH", "QA", "RU", "SA", "RS", "SG", "ZA", "LK", "TW", "TZ", "TH", "TR", "UA",
    "AE", "US", "VN",
];

/// An upper-case country/market code such as `US` or `ID`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// Creates a country code, trimming and upper-casing the input.
    #[must_use]
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A market to probe: the country plus the currency its prices are quoted in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale {
    country: CountryCode,
    currency: CurrencyCode,
}

impl Locale {
    /// Creates a locale.
    #[must_use]
    pub fn new(country: CountryCode, currency: CurrencyCode) -> Self {
        Self { country, currency }
    }

    /// Returns the country code.
    #[inline]
    #[must_use]
    pub fn country(&self) -> &CountryCode {
        &self.country
    }

    /// Returns the currency code.
    #[inline]
    #[must_use]
    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.country, self.currency)
    }
}

/// The ordered set of locales a run covers.
///
/// # Examples
///
/// ```
/// use regional_price_scan::domain::value_objects::locale::{CountryCode, LocaleCatalog};
///
/// let catalog = LocaleCatalog::with_defaults();
/// assert_eq!(catalog.currency_for(&CountryCode::new("jp")).as_str(), "JPY");
/// // Unknown countries are priced in the base currency.
/// assert_eq!(catalog.currency_for(&CountryCode::new("XX")).as_str(), "USD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleCatalog {
    countries: Vec<CountryCode>,
    currencies: HashMap<CountryCode, CurrencyCode>,
}

impl LocaleCatalog {
    /// Creates a catalog from an explicit country list and currency map.
    #[must_use]
    pub fn new(countries: Vec<CountryCode>, currencies: HashMap<CountryCode, CurrencyCode>) -> Self {
        Self {
            countries,
            currencies,
        }
    }

    /// Creates the catalog with the built-in country list and currency map.
    #[must_use]
    pub fn with_defaults() -> Self {
        let currencies = DEFAULT_CURRENCIES
            .iter()
            .map(|(country, currency)| (CountryCode::new(country), CurrencyCode::new(currency)))
            .collect();
        let countries = DEFAULT_COUNTRIES.iter().map(CountryCode::new).collect();
        Self::new(countries, currencies)
    }

    /// Replaces the probed country list, keeping the currency map.
    #[must_use]
    pub fn with_countries(mut self, countries: Vec<CountryCode>) -> Self {
        self.countries = countries;
        self
    }

    /// Adds or replaces the currency for one country.
    #[must_use]
    pub fn with_currency(mut self, country: CountryCode, currency: CurrencyCode) -> Self {
        self.currencies.insert(country, currency);
        self
    }

    /// Currency for a country, falling back to the base currency.
    #[must_use]
    pub fn currency_for(&self, country: &CountryCode) -> CurrencyCode {
        self.currencies
            .get(country)
            .cloned()
            .unwrap_or_else(CurrencyCode::base)
    }

    /// Resolves a single country into a locale.
    #[must_use]
    pub fn locale_for(&self, country: &CountryCode) -> Locale {
        Locale::new(country.clone(), self.currency_for(country))
    }

    /// All locales in probe order.
    #[must_use]
    pub fn locales(&self) -> Vec<Locale> {
        self.countries.iter().map(|c| self.locale_for(c)).collect()
    }

    /// Number of countries probed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    /// Returns true if no countries are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

impl Default for LocaleCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_covers_every_listed_country() {
        let catalog = LocaleCatalog::with_defaults();
        assert_eq!(catalog.len(), DEFAULT_COUNTRIES.len());

        for locale in catalog.locales() {
            assert!(
                !locale.currency().is_base() || locale.country().as_str() == "US",
                "{} fell back to the base currency",
                locale.country()
            );
        }
    }

    #[test]
    fn locales_preserve_probe_order() {
        let catalog = LocaleCatalog::with_defaults()
            .with_countries(vec![CountryCode::new("vn"), CountryCode::new("br")]);
        let locales = catalog.locales();

        assert_eq!(locales.len(), 2);
        assert_eq!(locales[0].to_string(), "VN/VND");
        assert_eq!(locales[1].to_string(), "BR/BRL");
    }

    #[test]
    fn override_currency() {
        let catalog = LocaleCatalog::with_defaults()
            .with_currency(CountryCode::new("XK"), CurrencyCode::new("EUR"));
        assert_eq!(catalog.currency_for(&CountryCode::new("XK")).as_str(), "EUR");
    }
}
