//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! - [`ItemId`]: the store item being priced
//! - [`CountryCode`], [`CurrencyCode`], [`Locale`], [`LocaleCatalog`]: markets
//! - [`Timestamp`]: wall-clock timestamps
//! - [`money`]: cent rounding rules

pub mod currency;
pub mod item;
pub mod locale;
pub mod money;
pub mod timestamp;

pub use currency::{BASE_CURRENCY, CurrencyCode};
pub use item::{ItemId, ItemIdError};
pub use locale::{CountryCode, Locale, LocaleCatalog};
pub use timestamp::Timestamp;
