//! Single-attempt catalog fetch against the remote FDSN endpoint.
//!
//! Exactly one GET per invocation, bounded by the configured timeout. The
//! failure union distinguishes timeout, connection, status and decode
//! failures; the pipeline treats them identically when deciding to fall
//! back, but logs and surfaces them distinctly.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;

use crate::config::CatalogConfig;
use crate::normalize::RawCatalogPayload;
use crate::query::QueryParams;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("catalog request timed out")]
    Timeout,

    #[error("failed to reach catalog service: {0}")]
    Connection(String),

    #[error("catalog service returned status {0}")]
    Status(u16),

    #[error("failed to decode catalog response: {0}")]
    Decode(String),
}

/// Seam over the remote catalog, so tests can substitute a double.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self, params: &QueryParams) -> Result<RawCatalogPayload, FetchError>;
}

/// Real fetcher backed by a shared reqwest client.
pub struct HttpCatalogFetcher {
    client: reqwest::Client,
    endpoint: String,
    request_timeout: Duration,
}

impl HttpCatalogFetcher {
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogFetcher {
    async fn fetch(&self, params: &QueryParams) -> Result<RawCatalogPayload, FetchError> {
        let pairs = params.to_query_pairs();
        debug!(endpoint = %self.endpoint, query = ?pairs, "requesting catalog");

        let request = self.client.get(&self.endpoint).query(&pairs).send();
        let response = timeout(self.request_timeout, request)
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(|e| FetchError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = timeout(self.request_timeout, response.json::<RawCatalogPayload>())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(url: &str, timeout_secs: u64) -> CatalogConfig {
        CatalogConfig {
            endpoint: url.to_string(),
            request_timeout_secs: timeout_secs,
            default_window_days: 60,
        }
    }

    #[tokio::test]
    async fn fetches_and_decodes_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("format", "geojson"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"features": []})),
            )
            .mount(&server)
            .await;

        let fetcher = HttpCatalogFetcher::new(&test_config(&server.uri(), 10));
        let params = QueryParams::build(None, None, 60);
        let payload = fetcher.fetch(&params).await.unwrap();
        assert_eq!(payload["features"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn sends_minmagnitude_only_when_supplied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("minmagnitude", "4.5"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"features": []})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpCatalogFetcher::new(&test_config(&server.uri(), 10));
        let params = QueryParams::build(None, Some("4.5"), 60);
        fetcher.fetch(&params).await.unwrap();
    }

    #[tokio::test]
    async fn remote_error_status_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = HttpCatalogFetcher::new(&test_config(&server.uri(), 10));
        let params = QueryParams::build(None, None, 60);
        match fetcher.fetch(&params).await {
            Err(FetchError::Status(500)) => {}
            other => panic!("expected Status(500), got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn undecodable_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let fetcher = HttpCatalogFetcher::new(&test_config(&server.uri(), 10));
        let params = QueryParams::build(None, None, 60);
        assert!(matches!(
            fetcher.fetch(&params).await,
            Err(FetchError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"features": []}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let fetcher = HttpCatalogFetcher::new(&test_config(&server.uri(), 1));
        let params = QueryParams::build(None, None, 60);
        assert!(matches!(
            fetcher.fetch(&params).await,
            Err(FetchError::Timeout)
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_connection_error() {
        // Reserved port with nothing listening
        let fetcher = HttpCatalogFetcher::new(&test_config("http://127.0.0.1:1/query", 10));
        let params = QueryParams::build(None, None, 60);
        assert!(matches!(
            fetcher.fetch(&params).await,
            Err(FetchError::Connection(_))
        ));
    }
}
