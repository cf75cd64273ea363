use async_trait::async_trait;

use crate::query::ArticleQuery;
use crate::types::StoredArticle;
use crate::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub upserted: usize,
    pub failed: usize,
}

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Human-readable backend name, for logs
    fn name(&self) -> &str;

    /// Articles matching the query, newest `published_at` first
    async fn find(&self, query: &ArticleQuery) -> Result<Vec<StoredArticle>>;

    /// Insert or replace each article by `url`. Items are independent: a
    /// failing item is counted in the summary and does not stop the rest.
    async fn upsert_many(&self, articles: &[StoredArticle]) -> Result<UpsertSummary>;

    async fn count(&self) -> Result<usize>;
}
