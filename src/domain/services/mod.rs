//! # Domain Services
//!
//! Pure functions over domain values:
//! - [`PriceStringParser`]: localized price strings → numeric bounds
//! - [`CurrencyConverter`]: source currency → USD

pub mod currency_converter;
pub mod price_parser;

pub use currency_converter::{CurrencyConverter, RateTable};
pub use price_parser::{ParseError, ParseResult, PriceStringParser, disambiguate_separators};
