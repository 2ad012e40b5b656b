//! # Configuration
//!
//! Layered application configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. environment variables prefixed `PRICE_SCAN`, nested with `__`
//!    (e.g. `PRICE_SCAN__RATE_LIMIT__CAPACITY=20`)
//!
//! A `.env` file in the working directory is loaded into the environment
//! before the sources are read.

use crate::application::services::batch_aggregation::AggregationConfig;
use crate::application::services::caller_quota::QuotaConfig;
use crate::domain::value_objects::{CountryCode, CurrencyCode, LocaleCatalog};
use crate::infrastructure::cache::result_cache::CacheConfig;
use crate::infrastructure::http::http_client::HttpConfig;
use crate::infrastructure::http::rate_limiter::RateLimitConfig;
use crate::infrastructure::http::retry::RetryPolicy;
use crate::infrastructure::rates::service::RatesConfig;
use crate::infrastructure::report::csv_sink::ReportConfig;
use crate::infrastructure::sources::store_listing::SourceConfig;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "PRICE_SCAN";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Locale catalog overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalesConfig {
    /// Countries to query, in order; the built-in list when absent.
    pub countries: Option<Vec<String>>,
    /// Extra or replacement country → currency mappings.
    pub currencies: HashMap<String, String>,
}

impl LocalesConfig {
    /// Builds the catalog from the defaults plus overrides.
    #[must_use]
    pub fn catalog(&self) -> LocaleCatalog {
        let mut catalog = LocaleCatalog::with_defaults();
        if let Some(countries) = &self.countries {
            catalog = catalog.with_countries(countries.iter().map(CountryCode::new).collect());
        }
        for (country, currency) in &self.currencies {
            catalog = catalog.with_currency(CountryCode::new(country), CurrencyCode::new(currency));
        }
        catalog
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client.
    pub http: HttpConfig,
    /// Global outbound rate limit.
    pub rate_limit: RateLimitConfig,
    /// Fetch retries.
    pub retry: RetryPolicy,
    /// Batch sizing and concurrency.
    pub aggregation: AggregationConfig,
    /// Result cache.
    pub cache: CacheConfig,
    /// Exchange rates.
    pub rates: RatesConfig,
    /// Report output.
    pub report: ReportConfig,
    /// Listing source.
    pub source: SourceConfig,
    /// Per-caller quota.
    pub quota: QuotaConfig,
    /// Locale catalog.
    pub locales: LocalesConfig,
    /// Logging.
    pub log: LogConfig,
}

impl AppConfig {
    /// Loads configuration from defaults, an optional file and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source cannot be read or the merged
    /// values are invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("locales.countries")
                    .with_list_parse_key("source.patterns"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Checks values the type system cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Message`] describing the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            (self.rate_limit.capacity == 0, "rate_limit.capacity must be positive"),
            (self.rate_limit.period_ms == 0, "rate_limit.period_ms must be positive"),
            (self.retry.max_attempts == 0, "retry.max_attempts must be positive"),
            (self.aggregation.batch_size == 0, "aggregation.batch_size must be positive"),
            (self.aggregation.max_in_flight == 0, "aggregation.max_in_flight must be positive"),
            (self.http.timeout_ms == 0, "http.timeout_ms must be positive"),
            (self.source.patterns.is_empty(), "source.patterns must not be empty"),
            (
                !self.source.url_template.contains("{item}"),
                "source.url_template must contain {item}",
            ),
        ];

        match checks.iter().find(|(failed, _)| *failed) {
            Some((_, message)) => Err(ConfigError::Message((*message).to_string())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rate_limit.capacity, 10);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.aggregation.batch_size, 5);
        assert_eq!(config.cache.ttl_secs, 86_400);
        assert_eq!(config.report.currency, "RUB");
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[rate_limit]\ncapacity = 20\n\n[report]\ncurrency = \"EUR\"\n\n[locales]\ncountries = [\"US\", \"DE\"]"
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.rate_limit.capacity, 20);
        assert_eq!(config.rate_limit.period_ms, 1_000);
        assert_eq!(config.report.currency, "EUR");
        assert_eq!(config.locales.catalog().len(), 2);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load(Some(Path::new("/nonexistent/price-scan.toml"))).unwrap();
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = AppConfig::default();
        config.aggregation.batch_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Message(_))));
    }

    #[test]
    fn currency_overrides_apply() {
        let locales = LocalesConfig {
            countries: Some(vec!["XX".to_string()]),
            currencies: HashMap::from([("XX".to_string(), "eur".to_string())]),
        };
        let catalog = locales.catalog();
        assert_eq!(catalog.currency_for(&CountryCode::new("XX")).as_str(), "EUR");
    }
}
