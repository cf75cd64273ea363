use async_trait::async_trait;

use crate::filter::{CanonicalFilter, Pagination};
use crate::types::Article;
use crate::Result;

/// A remote source of headlines.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch one page of articles for the filter. A provider-side failure,
    /// including an error-flagged body, is an `Error::RemoteProvider`.
    async fn fetch_articles(&self, filter: &CanonicalFilter, page: &Pagination) -> Result<Vec<Article>>;
}
