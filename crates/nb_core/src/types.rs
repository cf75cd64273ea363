use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::CanonicalFilter;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

/// A news item as returned by the remote provider. `url` is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    pub source: ArticleSource,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// An article as held by the store, stamped at write time with when it was
/// fetched and the filter that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredArticle {
    #[serde(flatten)]
    pub article: Article,
    pub fetched_at: DateTime<Utc>,
    pub query_params: CanonicalFilter,
}

impl StoredArticle {
    pub fn new(article: Article, fetched_at: DateTime<Utc>, query_params: CanonicalFilter) -> Self {
        Self {
            article,
            fetched_at,
            query_params,
        }
    }

    pub fn url(&self) -> &str {
        &self.article.url
    }
}
