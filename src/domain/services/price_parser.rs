//! # Price String Parser
//!
//! Turns localized price strings such as `"Rp 15.000 - Rp 150.000 per item"`
//! into numeric bounds without any locale metadata.
//!
//! # Pipeline
//!
//! ```text
//! raw ─► strip whitespace + currency affixes ─► first [0-9.,]+ run
//!     ─► disambiguate_separators ─► Decimal
//! ```
//!
//! # Separator Rules
//!
//! | Token shape                 | Interpretation                          |
//! |-----------------------------|-----------------------------------------|
//! | both `.` and `,`            | last one is decimal, other is thousands |
//! | several `.` (or `,`) only   | all thousands                           |
//! | one `.` (or `,`) only       | decimal if ≤ 2 digits follow            |
//! | no separator                | unchanged                               |
//!
//! The single-separator rule is a heuristic: `"1.500"` is read as fifteen
//! hundred, `"1.50"` as one and a half.
//!
//! [`PriceStringParser::parse_range`] applies the caller-level fallback: a
//! bound that fails to parse is retried with its first plain digit run.

use crate::domain::entities::PriceRange;
use crate::domain::value_objects::CurrencyCode;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a price string cannot be turned into a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No run of digits and separators was found.
    #[error("no numeric token in {input:?}")]
    NoNumericToken {
        /// The cleaned input that was searched.
        input: String,
    },

    /// A token was found but is not a valid number after normalization.
    #[error("token {token:?} is not numeric")]
    NotNumeric {
        /// The normalized token.
        token: String,
    },

    /// A price range is missing one of its sides.
    #[error("malformed price range {input:?}")]
    MalformedRange {
        /// The range segment.
        input: String,
    },
}

impl ParseError {
    /// Creates a no-numeric-token error.
    #[must_use]
    pub fn no_numeric_token(input: impl Into<String>) -> Self {
        Self::NoNumericToken {
            input: input.into(),
        }
    }

    /// Creates a not-numeric error.
    #[must_use]
    pub fn not_numeric(token: impl Into<String>) -> Self {
        Self::NotNumeric {
            token: token.into(),
        }
    }

    /// Creates a malformed-range error.
    #[must_use]
    pub fn malformed_range(input: impl Into<String>) -> Self {
        Self::MalformedRange {
            input: input.into(),
        }
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Literal symbols and codes that decorate prices in a given currency.
///
/// Matched after whitespace removal, so multi-word affixes are listed
/// without their separating space.
#[must_use]
pub fn currency_affixes(currency: &CurrencyCode) -> &'static [&'static str] {
    match currency.as_str() {
        "IDR" => &["Rp"],
        "JOD" => &["JOD"],
        "TRY" => &["TRY"],
        "JPY" => &["¥"],
        "KRW" => &["₩"],
        "INR" => &["₹"],
        "VND" => &["₫"],
        "HKD" => &["HK$"],
        "TWD" => &["NT$"],
        "USD" | "AUD" | "NZD" | "CAD" | "SGD" => &["$"],
        "ILS" => &["₪"],
        "ZAR" => &["R"],
        "COP" => &["COP"],
        _ => &[],
    }
}

/// Removes all whitespace (including non-breaking spaces) and the
/// currency's literal affixes.
#[must_use]
pub fn strip_decorations(raw: &str, currency: &CurrencyCode) -> String {
    let mut cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    for affix in currency_affixes(currency) {
        cleaned = cleaned.replace(affix, "");
    }
    cleaned
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || c == ','
}

/// Returns the first maximal run of ASCII digits, `.` and `,`.
#[must_use]
pub fn extract_numeric_token(input: &str) -> Option<&str> {
    let start = input.find(is_token_char)?;
    let rest = input.get(start..)?;
    let len = rest.find(|c: char| !is_token_char(c)).unwrap_or(rest.len());
    rest.get(..len)
}

/// Returns the first run of plain ASCII digits.
#[must_use]
pub fn first_digit_run(input: &str) -> Option<&str> {
    let start = input.find(|c: char| c.is_ascii_digit())?;
    let rest = input.get(start..)?;
    let len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest.get(..len)
}

/// Rewrites a numeric token so that `.` is the only (decimal) separator.
///
/// # Examples
///
/// ```
/// use regional_price_scan::domain::services::price_parser::disambiguate_separators;
///
/// assert_eq!(disambiguate_separators("1.234.567"), "1234567");
/// assert_eq!(disambiguate_separators("1,234,567.89"), "1234567.89");
/// assert_eq!(disambiguate_separators("2.150,00"), "2150.00");
/// assert_eq!(disambiguate_separators("2,00"), "2.00");
/// assert_eq!(disambiguate_separators("1.500"), "1500");
/// ```
#[must_use]
pub fn disambiguate_separators(token: &str) -> String {
    match (token.rfind('.'), token.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => token.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => token.replace(',', ""),
        (Some(_), None) => resolve_single_kind(token, '.'),
        (None, Some(_)) => resolve_single_kind(token, ','),
        (None, None) => token.to_string(),
    }
}

/// Only one kind of separator is present.
fn resolve_single_kind(token: &str, separator: char) -> String {
    let occurrences = token.matches(separator).count();
    if occurrences > 1 {
        return token.replace(separator, "");
    }

    let digits_after = token
        .split_once(separator)
        .map(|(_, fraction)| fraction.len())
        .unwrap_or(0);

    if digits_after <= 2 {
        token.replace(separator, ".")
    } else {
        token.replace(separator, "")
    }
}

/// Parses a normalized token (digits plus at most one `.`).
fn parse_normalized(normalized: &str) -> ParseResult<Decimal> {
    if !normalized.chars().any(|c| c.is_ascii_digit()) {
        return Err(ParseError::not_numeric(normalized));
    }

    let trimmed = normalized.strip_suffix('.').unwrap_or(normalized);
    let candidate = if trimmed.starts_with('.') {
        format!("0{trimmed}")
    } else {
        trimmed.to_string()
    };

    Decimal::from_str(&candidate).map_err(|_| ParseError::not_numeric(normalized))
}

/// Parser for localized price strings.
///
/// Stateless; every method is a pure function of its inputs.
///
/// # Examples
///
/// ```
/// use regional_price_scan::domain::services::price_parser::PriceStringParser;
/// use regional_price_scan::domain::value_objects::CurrencyCode;
/// use rust_decimal::Decimal;
///
/// let parser = PriceStringParser::new();
/// let range = parser
///     .parse_range("Rp 15.000 - Rp 150.000 per item", &CurrencyCode::new("IDR"))
///     .unwrap();
///
/// assert_eq!(range.min, Decimal::new(15_000, 0));
/// assert_eq!(range.max, Decimal::new(150_000, 0));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceStringParser;

impl PriceStringParser {
    /// Creates a parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parses a single price.
    ///
    /// # Errors
    ///
    /// - [`ParseError::NoNumericToken`] if no digit/separator run exists
    /// - [`ParseError::NotNumeric`] if the normalized token is not a number
    pub fn parse(&self, raw: &str, currency: &CurrencyCode) -> ParseResult<Decimal> {
        let cleaned = strip_decorations(raw, currency);
        let token = extract_numeric_token(&cleaned)
            .ok_or_else(|| ParseError::no_numeric_token(cleaned.as_str()))?;
        parse_normalized(&disambiguate_separators(token))
    }

    /// Parses a single price, falling back to the first plain digit run.
    ///
    /// # Errors
    ///
    /// Returns the original parse error if the fallback finds no digits.
    pub fn parse_lenient(&self, raw: &str, currency: &CurrencyCode) -> ParseResult<Decimal> {
        match self.parse(raw, currency) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::debug!(raw, error = %err, "falling back to digit-only extraction");
                first_digit_run(raw)
                    .and_then(|digits| Decimal::from_str(digits).ok())
                    .ok_or(err)
            }
        }
    }

    /// Parses a price or price range.
    ///
    /// Only the first `;`-separated segment is considered. A segment
    /// containing `-` is split into lower and upper bound; otherwise the
    /// single price is used for both.
    ///
    /// # Errors
    ///
    /// - [`ParseError::MalformedRange`] if a side of the range is empty
    /// - any error of [`Self::parse_lenient`] for either bound
    pub fn parse_range(&self, raw: &str, currency: &CurrencyCode) -> ParseResult<PriceRange> {
        let segment = raw.split(';').next().unwrap_or(raw).trim();

        match segment.split_once('-') {
            Some((low, rest)) => {
                let high = rest.split('-').next().unwrap_or(rest);
                let (low, high) = (low.trim(), high.trim());
                if low.is_empty() || high.is_empty() {
                    return Err(ParseError::malformed_range(segment));
                }
                Ok(PriceRange::new(
                    self.parse_lenient(low, currency)?,
                    self.parse_lenient(high, currency)?,
                ))
            }
            None => self
                .parse_lenient(segment, currency)
                .map(PriceRange::single),
        }
    }
}
