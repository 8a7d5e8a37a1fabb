//! Live HTTP fetch (tier 1).

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};

use super::error::ProviderError;
use super::types::{RawPayload, decode_payload};

/// Default URL of the ministry's station price endpoint.
const DEFAULT_BASE_URL: &str = "https://sedeaplicaciones.minetur.gob.es/ServiciosRESTCarburantes/PreciosCarburantes/EstacionesTerrestres/";

/// Browser-like user agent. The provider's content negotiation rejects some
/// non-browser clients outright.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Retry schedule: first attempt immediately, one retry after a short pause.
const FETCH_BACKOFF_MS: [u64; 2] = [0, 500];

/// Configuration for the live HTTP fetch.
#[derive(Debug, Clone)]
pub struct ProviderClientConfig {
    /// Endpoint URL.
    pub base_url: String,
    /// Request timeout in seconds. Generous: the full dataset is ~10 MB.
    pub timeout_secs: u64,
}

impl ProviderClientConfig {
    /// Create a config pointing at the production endpoint.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }

    /// Set a custom endpoint URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for ProviderClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client for the live provider endpoint.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProviderClient {
    /// Create a new provider client.
    pub fn new(config: ProviderClientConfig) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Fetch the full raw dataset.
    ///
    /// Retries once on failure per the backoff schedule. Any non-2xx status,
    /// transport error, or JSON-decode failure counts as a failed attempt.
    pub async fn fetch(&self) -> Result<RawPayload, ProviderError> {
        let mut last_error: Option<ProviderError> = None;

        for (attempt, delay_ms) in FETCH_BACKOFF_MS.iter().copied().enumerate() {
            if delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            }

            match self.fetch_once().await {
                Ok(payload) => return Ok(payload),
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "live fetch attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(ProviderError::NoSource))
    }

    async fn fetch_once(&self) -> Result<RawPayload, ProviderError> {
        let response = self.http.get(&self.base_url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        decode_payload(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload_json() -> serde_json::Value {
        serde_json::json!({
            "Fecha": "01/06/2025 8:00:00",
            "ListaEESSPrecio": [{"IDEESS": "1111", "Latitud": "40,4269"}]
        })
    }

    #[test]
    fn config_defaults() {
        let config = ProviderClientConfig::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn config_with_base_url() {
        let config = ProviderClientConfig::new().with_base_url("http://localhost:8080");
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[tokio::test]
    async fn fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload_json()))
            .mount(&server)
            .await;

        let client =
            ProviderClient::new(ProviderClientConfig::new().with_base_url(server.uri())).unwrap();
        let payload = client.fetch().await.unwrap();
        assert_eq!(payload.stations.len(), 1);
    }

    #[tokio::test]
    async fn fetch_error_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client =
            ProviderClient::new(ProviderClientConfig::new().with_base_url(server.uri())).unwrap();
        match client.fetch().await {
            Err(ProviderError::Api { status: 503 }) => {}
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_retries_after_transient_failure() {
        let server = MockServer::start().await;
        // First request fails, second succeeds.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload_json()))
            .mount(&server)
            .await;

        let client =
            ProviderClient::new(ProviderClientConfig::new().with_base_url(server.uri())).unwrap();
        let payload = client.fetch().await.unwrap();
        assert_eq!(payload.stations.len(), 1);
    }

    #[tokio::test]
    async fn fetch_undecodable_body_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
            .mount(&server)
            .await;

        let client =
            ProviderClient::new(ProviderClientConfig::new().with_base_url(server.uri())).unwrap();
        assert!(matches!(
            client.fetch().await,
            Err(ProviderError::Json { .. })
        ));
    }
}
