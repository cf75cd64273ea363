use std::fmt;
use std::time::Duration;

use crate::{Error, Result};

pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Process-wide configuration, resolved once at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub news_api_key: Option<String>,
    pub news_api_url: String,
    pub request_timeout: Duration,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url)
            .field("news_api_key", &self.news_api_key.as_deref().map(|_| "<redacted>"))
            .field("news_api_url", &self.news_api_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            news_api_key: None,
            news_api_url: DEFAULT_NEWS_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    pub fn database_url(&self) -> Result<&str> {
        non_empty(self.database_url.as_deref())
            .ok_or_else(|| Error::Configuration("DATABASE_URL is not set".to_string()))
    }

    /// The provider credential, if one was configured.
    pub fn news_api_key(&self) -> Option<&str> {
        non_empty(self.news_api_key.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_database_url_is_configuration_error() {
        let config = AppConfig::default();
        assert!(matches!(config.database_url(), Err(Error::Configuration(_))));

        let config = AppConfig {
            database_url: Some("  ".to_string()),
            ..AppConfig::default()
        };
        assert!(config.database_url().is_err());
    }

    #[test]
    fn test_api_key_is_redacted_in_debug() {
        let config = AppConfig {
            news_api_key: Some("secret-key".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.news_api_key(), Some("secret-key"));
        assert!(!format!("{:?}", config).contains("secret-key"));
    }
}
