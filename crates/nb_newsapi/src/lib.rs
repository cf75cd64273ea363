//! Client for the NewsAPI v2 headline and full-text endpoints.

use async_trait::async_trait;
use nb_core::{AppConfig, Article, CanonicalFilter, Error, NewsProvider, Pagination, Result};
use std::fmt;
use std::time::Duration;
use tracing::debug;

pub mod request;
pub mod response;

pub use request::{Endpoint, NewsApiRequest, DEFAULT_SEARCH_TERM};
pub use response::Envelope;

const API_KEY_HEADER: &str = "X-Api-Key";

#[derive(Clone)]
pub struct NewsApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl fmt::Debug for NewsApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl NewsApiConfig {
    /// `None` when no credential is configured.
    pub fn from_app_config(config: &AppConfig) -> Option<Self> {
        config.news_api_key().map(|api_key| Self {
            base_url: config.news_api_url.clone(),
            api_key: api_key.to_string(),
            timeout: config.request_timeout,
        })
    }
}

#[derive(Debug)]
pub struct NewsApiClient {
    client: reqwest::Client,
    config: NewsApiConfig,
}

impl NewsApiClient {
    pub fn new(config: NewsApiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Configuration("News API key is required".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("newsboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub async fn send(&self, request: &NewsApiRequest) -> Result<Vec<Article>> {
        let url = request.url(&self.config.base_url)?;
        debug!("📰 GET {}", url);

        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            let detail = serde_json::from_str::<Envelope>(&body)
                .map(|envelope| envelope.describe())
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(Error::RemoteProvider(format!("HTTP {}: {}", status.as_u16(), detail)));
        }

        let envelope: Envelope = serde_json::from_str(&body)
            .map_err(|e| Error::RemoteProvider(format!("Malformed response: {}", e)))?;
        let articles = envelope.into_articles()?;
        debug!("📰 {} returned {} articles", request.endpoint.path(), articles.len());
        Ok(articles)
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    fn name(&self) -> &str {
        "NewsAPI"
    }

    async fn fetch_articles(&self, filter: &CanonicalFilter, page: &Pagination) -> Result<Vec<Article>> {
        self.send(&NewsApiRequest::from_filter(filter, page)).await
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::RemoteProvider("Request timed out".to_string())
    } else {
        Error::RemoteProvider(format!("Request failed: {}", e))
    }
}
