//! HTTP client wrapper shared by the resolver and the fetcher.

use crate::config::DownloadConfig;
use crate::error::{DownloadError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// HTTP client with redirect following and explicit timeouts.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: Arc<DownloadConfig>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("client", &"reqwest::Client")
            .field("config", &self.config)
            .finish()
    }
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the client cannot be built.
    pub fn new(config: DownloadConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .tcp_nodelay(true)
            .gzip(true)
            .use_rustls_tls();

        if let Some(timeout) = config.total_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| DownloadError::network(e.to_string()))?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Create a client with default configuration.
    ///
    /// # Errors
    /// Returns error if the client cannot be built.
    pub fn with_defaults() -> Result<Self> {
        Self::new(DownloadConfig::default())
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &Arc<DownloadConfig> {
        &self.config
    }

    /// Send a GET request, following redirects and raising on non-2xx.
    ///
    /// # Errors
    /// Returns error if the request fails or the final status is not success.
    pub async fn get(&self, url: &Url) -> Result<Response> {
        debug!(url = %url, "GET request");

        let response = self
            .client
            .get(url.as_str())
            .headers(self.default_headers())
            .send()
            .await?;

        Self::check_response(response)
    }

    /// GET a URL and return the response body as text.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_text(&self, url: &Url) -> Result<String> {
        let response = self.get(url).await?;
        response
            .text()
            .await
            .map_err(|e| DownloadError::network(e.to_string()))
    }

    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(ua) = HeaderValue::from_str(&self.config.user_agent) {
            headers.insert(USER_AGENT, ua);
        }
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers
    }

    fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();

        match status {
            StatusCode::NOT_FOUND => Err(DownloadError::NotFound { url }),
            _ if status.is_server_error() => Err(DownloadError::ServerError {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("server error")
                    .to_string(),
            }),
            _ => Err(DownloadError::Network {
                message: format!("unexpected status {status} for {url}"),
                status_code: Some(status.as_u16()),
            }),
        }
    }
}
