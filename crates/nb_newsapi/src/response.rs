use chrono::{DateTime, Utc};
use nb_core::{Article, ArticleSource, Error, Result};
use serde::Deserialize;
use tracing::debug;

/// The provider's JSON envelope. Both success and error bodies use it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status: String,
    #[serde(default)]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub articles: Option<Vec<RawArticle>>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub source: Option<RawSource>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Envelope {
    /// The articles of an `"ok"` envelope; anything else is a provider error.
    pub fn into_articles(self) -> Result<Vec<Article>> {
        if self.status != "ok" {
            return Err(Error::RemoteProvider(self.describe()));
        }
        Ok(self
            .articles
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawArticle::into_article)
            .collect())
    }

    pub fn describe(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{}: {}", code, message),
            (None, Some(message)) => message.clone(),
            (Some(code), None) => code.clone(),
            (None, None) => format!("status '{}'", self.status),
        }
    }
}

impl RawArticle {
    fn into_article(self) -> Option<Article> {
        let Some(url) = self.url.filter(|u| !u.trim().is_empty()) else {
            debug!("Skipping article without url: {:?}", self.title);
            return None;
        };
        let source = self.source.unwrap_or(RawSource { id: None, name: None });

        Some(Article {
            url,
            title: self.title.unwrap_or_default(),
            description: self.description,
            url_to_image: self.url_to_image,
            author: self.author,
            content: self.content,
            source: ArticleSource {
                id: source.id,
                name: source.name.unwrap_or_default(),
            },
            published_at: self
                .published_at
                .as_deref()
                .and_then(|p| DateTime::parse_from_rfc3339(p).ok())
                .map(|p| p.with_timezone(&Utc)),
        })
    }
}
