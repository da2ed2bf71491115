/// Remote Catalog Source
///
/// One read-only operation: GET the static catalog JSON document.
/// Implementations classify transport failures into the crate's error
/// taxonomy before the repository sees them.
use crate::error::{CatalogError, CatalogResult};
use async_trait::async_trait;

/// Remote boundary trait
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the catalog document, returning the raw response body on a
    /// success status.
    async fn fetch_catalog(&self) -> CatalogResult<String>;
}

/// Configuration for the HTTP catalog source
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Full URL of the catalog document
    pub catalog_url: String,
    /// User-Agent header for HTTP requests
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            catalog_url:
                "https://raw.githubusercontent.com/erik-sytnyk/movies-list/master/db.json"
                    .to_string(),
            user_agent: "cinefile/0.1".to_string(),
            timeout_secs: 10,
        }
    }
}

/// reqwest-backed catalog source
pub struct HttpCatalogSource {
    http_client: reqwest::Client,
    config: HttpSourceConfig,
}

impl HttpCatalogSource {
    pub fn new(config: HttpSourceConfig) -> CatalogResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogError::Unexpected(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
        })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_catalog(&self) -> CatalogResult<String> {
        tracing::debug!("Fetching catalog from {}", self.config.catalog_url);

        let response = self
            .http_client
            .get(&self.config.catalog_url)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::HttpStatus {
                code: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("Unknown")
                    .to_string(),
            });
        }

        let body = response.text().await.map_err(classify_transport_error)?;
        Ok(body)
    }
}

/// Map reqwest failures onto the protocol/connectivity/unexpected taxonomy
fn classify_transport_error(e: reqwest::Error) -> CatalogError {
    if e.is_connect() || e.is_timeout() {
        CatalogError::Connectivity(e.to_string())
    } else if e.is_status() || e.is_redirect() || e.is_request() {
        CatalogError::Protocol(e.to_string())
    } else {
        CatalogError::Unexpected(e.to_string())
    }
}
