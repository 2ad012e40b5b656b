//! # Store Listing Probe
//!
//! [`SourceProbe`] that scrapes an app-store listing page per country.
//!
//! The listing URL is built from a template with `{item}` and `{country}`
//! placeholders. A page is only considered if it carries the required
//! marker; the price string is then taken from the first extraction
//! pattern that matches anywhere in the body. When none match, a fallback
//! pattern for bare `"$x - $y"` ranges is tried and a suffix appended so
//! the result reads like the primary form.

use crate::domain::value_objects::{ItemId, Locale};
use crate::infrastructure::http::retry::{FetchOutcome, RetryingFetcher};
use crate::infrastructure::sources::error::{ProbeError, ProbeResult};
use crate::infrastructure::sources::traits::SourceProbe;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default listing URL template.
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://play.google.com/store/apps/details?id={item}&hl=en&gl={country}";

/// Default store name.
pub const DEFAULT_STORE: &str = "google";

/// Marker that must be present for the page to carry prices.
pub const DEFAULT_REQUIRED_MARKER: &str = "In-app purchases";

/// Body text served in place of a 404 status.
pub const DEFAULT_NOT_FOUND_MARKER: &str =
    "We're sorry, the requested URL was not found on this server.";

/// Primary extraction patterns, tried in order.
pub const DEFAULT_PATTERNS: [&str; 3] = [
    r#""([^"]*?\sper\sitem)""#,
    r#""([^"]*?)"[^>]*?>\s*per item"#,
    r">([^<]*?\sper\sitem)<",
];

/// Fallback pattern for bare dollar ranges.
pub const DEFAULT_FALLBACK_PATTERN: &str = r#""(\$[\d,.]+ - \$[\d,.]+)""#;

/// Suffix appended to fallback matches.
pub const DEFAULT_FALLBACK_SUFFIX: &str = " per item";

/// Listing source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Store name used in cache keys and file names.
    pub store: String,
    /// URL template with `{item}` and `{country}` placeholders.
    pub url_template: String,
    /// Text that must appear in the page.
    pub required_marker: String,
    /// Text that marks a soft 404.
    pub not_found_marker: String,
    /// Ordered extraction patterns; capture group 1 is the price.
    pub patterns: Vec<String>,
    /// Optional fallback pattern; capture group 1 is the price.
    pub fallback_pattern: Option<String>,
    /// Appended to fallback matches.
    pub fallback_suffix: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            store: DEFAULT_STORE.to_string(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            required_marker: DEFAULT_REQUIRED_MARKER.to_string(),
            not_found_marker: DEFAULT_NOT_FOUND_MARKER.to_string(),
            patterns: DEFAULT_PATTERNS.iter().map(|p| (*p).to_string()).collect(),
            fallback_pattern: Some(DEFAULT_FALLBACK_PATTERN.to_string()),
            fallback_suffix: DEFAULT_FALLBACK_SUFFIX.to_string(),
        }
    }
}

impl SourceConfig {
    /// Sets the URL template.
    #[must_use]
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    /// Sets the store name.
    #[must_use]
    pub fn with_store(mut self, store: impl Into<String>) -> Self {
        self.store = store.into();
        self
    }

    /// Sets the extraction patterns.
    #[must_use]
    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns = patterns;
        self
    }

    /// Sets or clears the fallback pattern.
    #[must_use]
    pub fn with_fallback_pattern(mut self, pattern: Option<String>) -> Self {
        self.fallback_pattern = pattern;
        self
    }

    /// Expands the URL template for one locale.
    #[must_use]
    pub fn url_for(&self, item: &ItemId, locale: &Locale) -> String {
        self.url_template
            .replace("{item}", item.as_str())
            .replace("{country}", locale.country().as_str())
    }
}

/// Invalid listing source configuration.
#[derive(Debug, Error)]
pub enum SourceConfigError {
    /// A pattern failed to compile.
    #[error("invalid extraction pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Compiler error.
        #[source]
        source: regex::Error,
    },

    /// No primary patterns were configured.
    #[error("at least one extraction pattern is required")]
    NoPatterns,
}

fn compile(pattern: &str) -> Result<Regex, SourceConfigError> {
    Regex::new(pattern).map_err(|source| SourceConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Scrapes listing pages through a [`RetryingFetcher`].
#[derive(Debug, Clone)]
pub struct StoreListingProbe {
    config: SourceConfig,
    patterns: Vec<Regex>,
    fallback: Option<Regex>,
    fetcher: RetryingFetcher,
}

impl StoreListingProbe {
    /// Creates a probe, compiling every configured pattern.
    ///
    /// # Errors
    ///
    /// Returns [`SourceConfigError`] if a pattern is invalid or none are set.
    pub fn new(config: SourceConfig, fetcher: RetryingFetcher) -> Result<Self, SourceConfigError> {
        if config.patterns.is_empty() {
            return Err(SourceConfigError::NoPatterns);
        }
        let patterns = config
            .patterns
            .iter()
            .map(String::as_str)
            .map(compile)
            .collect::<Result<Vec<_>, _>>()?;
        let fallback = config.fallback_pattern.as_deref().map(compile).transpose()?;

        Ok(Self {
            config,
            patterns,
            fallback,
            fetcher,
        })
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Extracts the price string from a page body.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::FeatureAbsent`] if the required marker is
    /// missing and [`ProbeError::NoPriceFound`] if nothing matches.
    pub fn extract(&self, body: &str) -> ProbeResult<String> {
        if !body.contains(&self.config.required_marker) {
            return Err(ProbeError::feature_absent(&self.config.required_marker));
        }

        let primary = self.patterns.iter().find_map(|pattern| {
            pattern
                .captures_iter(body)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().trim())
                .find(|price| !price.is_empty())
        });
        if let Some(price) = primary {
            return Ok(price.to_string());
        }

        self.fallback
            .as_ref()
            .and_then(|pattern| pattern.captures(body))
            .and_then(|caps| caps.get(1))
            .map(|m| format!("{}{}", m.as_str(), self.config.fallback_suffix))
            .ok_or(ProbeError::NoPriceFound)
    }
}

#[async_trait]
impl SourceProbe for StoreListingProbe {
    fn store(&self) -> &str {
        &self.config.store
    }

    async fn probe(
        &self,
        locale: &Locale,
        item: &ItemId,
        cancel: &CancellationToken,
    ) -> ProbeResult<String> {
        let url = self.config.url_for(item, locale);

        let body = match self.fetcher.fetch(&url, cancel).await? {
            FetchOutcome::NotFound => return Err(ProbeError::NotFound),
            FetchOutcome::Success { body, .. } => body,
        };

        if body.is_empty() {
            return Err(ProbeError::EmptyResponse);
        }
        if body.contains(&self.config.not_found_marker) {
            return Err(ProbeError::NotFound);
        }

        debug!(country = %locale.country(), item = %item, bytes = body.len(), "listing fetched");
        self.extract(&body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{CountryCode, CurrencyCode};
    use crate::infrastructure::http::error::FetchError;
    use crate::infrastructure::http::http_client::HttpResponse;
    use crate::infrastructure::http::rate_limiter::RateLimiter;
    use crate::infrastructure::http::retry::tests::ScriptedTransport;
    use crate::infrastructure::http::retry::RetryPolicy;
    use std::sync::Arc;
    use std::time::Duration;

    fn probe_with(response: Result<HttpResponse, FetchError>) -> StoreListingProbe {
        let fetcher = RetryingFetcher::new(
            Arc::new(ScriptedTransport::new(vec![response])),
            Arc::new(RateLimiter::new(100, Duration::from_secs(1))),
            RetryPolicy::default().with_backoff_base(Duration::from_millis(1)),
        );
        StoreListingProbe::new(SourceConfig::default(), fetcher).unwrap()
    }

    fn locale() -> Locale {
        Locale::new(CountryCode::new("US"), CurrencyCode::new("USD"))
    }

    fn item() -> ItemId {
        ItemId::new("com.example.app").unwrap()
    }

    #[test]
    fn url_template_expansion() {
        let url = SourceConfig::default().url_for(&item(), &locale());
        assert_eq!(
            url,
            "https://play.google.com/store/apps/details?id=com.example.app&hl=en&gl=US"
        );
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let fetcher = RetryingFetcher::new(
            Arc::new(ScriptedTransport::new(vec![Ok(HttpResponse::new(200, ""))])),
            Arc::new(RateLimiter::default()),
            RetryPolicy::default(),
        );
        let config = SourceConfig::default().with_patterns(vec!["(".to_string()]);
        assert!(matches!(
            StoreListingProbe::new(config, fetcher),
            Err(SourceConfigError::InvalidPattern { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn extracts_first_primary_match() {
        let body = r#"In-app purchases <div aria-label="$0.99 - $49.99 per item"></div>
            <span>"$2.00 per item"</span>"#;
        let probe = probe_with(Ok(HttpResponse::new(200, body)));

        let raw = probe
            .probe(&locale(), &item(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(raw, "$0.99 - $49.99 per item");
    }

    #[tokio::test(start_paused = true)]
    async fn falls_back_to_bare_range() {
        let body = r#"In-app purchases {"price":"$1.99 - $9.99"}"#;
        let probe = probe_with(Ok(HttpResponse::new(200, body)));

        let raw = probe
            .probe(&locale(), &item(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(raw, "$1.99 - $9.99 per item");
    }

    #[tokio::test(start_paused = true)]
    async fn missing_marker_is_feature_absent() {
        let probe = probe_with(Ok(HttpResponse::new(200, r#""$1.00 per item""#)));
        let error = probe
            .probe(&locale(), &item(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(error, ProbeError::FeatureAbsent { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn status_and_soft_404_are_not_found() {
        let probe = probe_with(Ok(HttpResponse::new(404, "")));
        let error = probe
            .probe(&locale(), &item(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(error, ProbeError::NotFound);

        let probe = probe_with(Ok(HttpResponse::new(200, DEFAULT_NOT_FOUND_MARKER)));
        let error = probe
            .probe(&locale(), &item(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(error, ProbeError::NotFound);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_body_and_no_match() {
        let probe = probe_with(Ok(HttpResponse::new(200, "")));
        let error = probe
            .probe(&locale(), &item(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(error, ProbeError::EmptyResponse);

        let probe = probe_with(Ok(HttpResponse::new(200, "In-app purchases, no prices")));
        let error = probe
            .probe(&locale(), &item(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(error, ProbeError::NoPriceFound);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_fetch_is_wrapped() {
        let probe = probe_with(Ok(HttpResponse::new(500, "")));
        let error = probe
            .probe(&locale(), &item(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(error, ProbeError::Fetch(FetchError::Exhausted { .. })));
    }
}
