//! # HTTP Transport
//!
//! The outbound HTTP port used by every fetch, plus its `reqwest` adapter.
//!
//! The transport performs exactly one attempt and returns whatever status
//! the server sent. Classifying statuses and retrying is the job of
//! [`RetryingFetcher`](super::retry::RetryingFetcher).
//!
//! # Examples
//!
//! ```ignore
//! use regional_price_scan::infrastructure::http::http_client::{HttpTransport, ReqwestTransport};
//!
//! let transport = ReqwestTransport::new(&HttpConfig::default())?;
//! let response = transport.get("https://example.com/listing").await?;
//! println!("{} bytes, status {}", response.body.len(), response.status);
//! ```

use crate::infrastructure::http::error::{FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-attempt timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// HTTP client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Optional `User-Agent` header.
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: None,
        }
    }
}

impl HttpConfig {
    /// Sets the per-attempt timeout.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// A raw HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Body decoded as text.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for a 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true for a 404 status.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Single-attempt GET transport.
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    /// Issues one GET request.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Timeout`] or [`FetchError::Transport`] when no
    /// response was received, and [`FetchError::Body`] when the body could
    /// not be read. Non-success statuses are *not* errors at this level.
    async fn get(&self, url: &str) -> FetchResult<HttpResponse>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout_ms: u64,
}

impl ReqwestTransport {
    /// Creates a transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the client cannot be created.
    pub fn new(config: &HttpConfig) -> FetchResult<Self> {
        let mut builder = Client::builder().timeout(Duration::from_millis(config.timeout_ms));
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::client(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout_ms: config.timeout_ms,
        })
    }

    /// Returns the configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    fn map_reqwest_error(&self, error: &reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::timeout(format!("request timed out after {}ms", self.timeout_ms))
        } else if error.is_connect() {
            FetchError::transport(format!("connection failed: {error}"))
        } else {
            FetchError::transport(format!("request failed: {error}"))
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> FetchResult<HttpResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(&e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                self.map_reqwest_error(&e)
            } else {
                FetchError::body(e.to_string())
            }
        })?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn new_transport() {
        let transport = ReqwestTransport::new(&HttpConfig::default()).unwrap();
        assert_eq!(transport.timeout_ms(), DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn response_classification() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(HttpResponse::new(404, "").is_not_found());
    }

    #[tokio::test]
    async fn returns_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/listing"))
            .and(header("user-agent", "price-scan-test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("In-app purchases"))
            .mount(&server)
            .await;

        let transport =
            ReqwestTransport::new(&HttpConfig::default().with_user_agent("price-scan-test"))
                .unwrap();
        let response = transport
            .get(&format!("{}/listing", server.uri()))
            .await
            .unwrap();

        assert_eq!(response, HttpResponse::new(200, "In-app purchases"));
    }

    #[tokio::test]
    async fn error_statuses_are_not_transport_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(&HttpConfig::default()).unwrap();
        let response = transport.get(&server.uri()).await.unwrap();

        assert_eq!(response.status, 503);
        assert_eq!(response.body, "busy");
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let transport =
            ReqwestTransport::new(&HttpConfig::default().with_timeout_ms(50)).unwrap();
        let error = transport.get(&server.uri()).await.unwrap_err();

        assert!(matches!(error, FetchError::Timeout { .. }));
    }
}
