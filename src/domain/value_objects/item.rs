//! # Item Identifier
//!
//! The identifier of the store item whose prices are collected.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Host a listing URL must point at for [`ItemId::from_store_url`].
const STORE_HOST: &str = "play.google.com";

#[allow(clippy::expect_used)]
static STORE_ID_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"id=([\w.]+)").expect("static pattern is valid"));

/// Error returned when an item identifier cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemIdError {
    /// The identifier was empty.
    #[error("item id is empty")]
    Empty,

    /// The identifier contains characters outside `[A-Za-z0-9_.]`.
    #[error("item id contains invalid characters: {0}")]
    InvalidCharacters(String),

    /// The URL is not a recognised store listing.
    #[error("not a store listing url: {0}")]
    UnsupportedUrl(String),
}

/// Identifier of a store item, e.g. `com.example.app`.
///
/// # Examples
///
/// ```
/// use regional_price_scan::domain::value_objects::item::ItemId;
///
/// let id = ItemId::from_store_url(
///     "https://play.google.com/store/apps/details?id=com.example.app&hl=en",
/// ).unwrap();
/// assert_eq!(id.as_str(), "com.example.app");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an item identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ItemIdError::Empty`] for blank input and
    /// [`ItemIdError::InvalidCharacters`] for anything outside `[A-Za-z0-9_.]`.
    pub fn new(id: impl Into<String>) -> Result<Self, ItemIdError> {
        let id = id.into();
        let id = id.trim();
        if id.is_empty() {
            return Err(ItemIdError::Empty);
        }
        if !id.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.') {
            return Err(ItemIdError::InvalidCharacters(id.to_string()));
        }
        Ok(Self(id.to_string()))
    }

    /// Extracts the item identifier from a store listing URL.
    ///
    /// # Errors
    ///
    /// Returns [`ItemIdError::UnsupportedUrl`] if the URL is not a store
    /// listing or carries no `id` parameter.
    pub fn from_store_url(url: &str) -> Result<Self, ItemIdError> {
        if !url.contains(STORE_HOST) {
            return Err(ItemIdError::UnsupportedUrl(url.to_string()));
        }
        let id = STORE_ID_PARAM
            .captures(url)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| ItemIdError::UnsupportedUrl(url.to_string()))?;
        Self::new(id.as_str())
    }

    /// Accepts either a store listing URL or a bare identifier.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`ItemId::from_store_url`] or [`ItemId::new`].
    pub fn parse(input: &str) -> Result<Self, ItemIdError> {
        if input.contains("://") || input.contains(STORE_HOST) {
            Self::from_store_url(input)
        } else {
            Self::new(input)
        }
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bare_identifier() {
        let id = ItemId::new(" com.example.game ").unwrap();
        assert_eq!(id.as_str(), "com.example.game");
    }

    #[test]
    fn rejects_empty_and_invalid() {
        assert_eq!(ItemId::new("  "), Err(ItemIdError::Empty));
        assert!(matches!(
            ItemId::new("com/example"),
            Err(ItemIdError::InvalidCharacters(_))
        ));
    }

    #[test]
    fn extracts_from_listing_url() {
        let id = ItemId::parse("https://play.google.com/store/apps/details?id=org.demo_app.x").unwrap();
        assert_eq!(id.as_str(), "org.demo_app.x");
    }

    #[test]
    fn rejects_foreign_urls() {
        assert!(matches!(
            ItemId::parse("https://apps.apple.com/app/id123"),
            Err(ItemIdError::UnsupportedUrl(_))
        ));
        assert!(matches!(
            ItemId::from_store_url("https://play.google.com/store/apps"),
            Err(ItemIdError::UnsupportedUrl(_))
        ));
    }
}
