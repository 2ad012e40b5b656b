//! # Rate Sources
//!
//! Where exchange rates come from.
//!
//! The upstream document lists, under a `usd` object, how many units of
//! each (lower-case) currency one US dollar buys:
//!
//! ```json
//! { "date": "2024-05-01", "usd": { "eur": 0.93, "idr": 16051.2 } }
//! ```

use crate::domain::services::currency_converter::RateTable;
use crate::domain::value_objects::{CurrencyCode, Timestamp};
use crate::infrastructure::rates::error::{RatesError, RatesResult};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Default rate document URL.
pub const DEFAULT_RATES_URL: &str =
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1/currencies/usd.json";

#[derive(Debug, Deserialize)]
struct RateDocument {
    usd: HashMap<String, f64>,
}

/// Decodes a rate document into a table stamped with `fetched_at`.
///
/// Non-finite and non-positive values are skipped.
///
/// # Errors
///
/// Returns [`RatesError::Decode`] if the body is not a rate document.
pub fn parse_rate_document(body: &str, fetched_at: Timestamp) -> RatesResult<RateTable> {
    let document: RateDocument = serde_json::from_str(body)?;

    let rates: HashMap<CurrencyCode, Decimal> = document
        .usd
        .into_iter()
        .filter_map(|(code, value)| {
            let rate = Decimal::try_from(value).ok().filter(|r| *r > Decimal::ZERO);
            if rate.is_none() {
                debug!(currency = %code, value, "skipping unusable rate");
            }
            rate.map(|rate| (CurrencyCode::new(code), rate))
        })
        .collect();

    Ok(RateTable::new(rates, fetched_at))
}

/// Supplies fresh exchange rates.
#[async_trait]
pub trait RateSource: Send + Sync + std::fmt::Debug {
    /// Fetches the current rates.
    ///
    /// # Errors
    ///
    /// Returns [`RatesError`] if rates cannot be obtained.
    async fn fetch(&self) -> RatesResult<RateTable>;
}

/// Reads the rate document over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRateSource {
    client: Client,
    url: String,
}

impl HttpRateSource {
    /// Creates a source for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`RatesError::Request`] if the client cannot be created.
    pub fn new(url: impl Into<String>, timeout: Duration) -> RatesResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RatesError::request(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// The document URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch(&self) -> RatesResult<RateTable> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| RatesError::request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RatesError::request(format!("unexpected status {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RatesError::request(e.to_string()))?;
        parse_rate_document(&body, Timestamp::now())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DOCUMENT: &str =
        r#"{"date":"2024-05-01","usd":{"eur":0.93,"idr":16051.2,"rub":92.5,"bad":0}}"#;

    #[test]
    fn parses_and_upper_cases_codes() {
        let table = parse_rate_document(DOCUMENT, Timestamp::now()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.get(&CurrencyCode::new("IDR")),
            Some(Decimal::from_str("16051.2").unwrap())
        );
        assert_eq!(table.get(&CurrencyCode::new("BAD")), None);
    }

    #[test]
    fn rejects_foreign_documents() {
        assert!(matches!(
            parse_rate_document(r#"{"eur":{"usd":1.07}}"#, Timestamp::now()),
            Err(RatesError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn http_source_fetches_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/usd.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DOCUMENT))
            .mount(&server)
            .await;

        let source =
            HttpRateSource::new(format!("{}/usd.json", server.uri()), Duration::from_secs(5))
                .unwrap();
        let table = source.fetch().await.unwrap();
        assert_eq!(
            table.get(&CurrencyCode::new("RUB")),
            Some(Decimal::from_str("92.5").unwrap())
        );
    }

    #[tokio::test]
    async fn http_source_reports_bad_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let source = HttpRateSource::new(server.uri(), Duration::from_secs(5)).unwrap();
        assert!(matches!(
            source.fetch().await,
            Err(RatesError::Request { .. })
        ));
    }
}
