use chrono::Utc;
use nb_core::{
    Article, ArticleQuery, ArticleStorage, CanonicalFilter, Error, NewsProvider, Pagination,
    Result, StoredArticle,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a served result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Remote,
}

#[derive(Debug)]
pub struct Reconciled {
    pub articles: Vec<StoredArticle>,
    pub origin: Origin,
}

/// Cache-first retrieval: look up the store, fall back to the provider on a
/// miss, upsert what it returns, then answer from the store again.
pub struct Reconciler {
    storage: Arc<dyn ArticleStorage>,
    provider: Option<Arc<dyn NewsProvider>>,
}

impl Reconciler {
    pub fn new(storage: Arc<dyn ArticleStorage>, provider: Option<Arc<dyn NewsProvider>>) -> Self {
        Self { storage, provider }
    }

    pub async fn reconcile(&self, filter: &CanonicalFilter, page: Pagination) -> Result<Reconciled> {
        let query = ArticleQuery::new(filter, page);

        let cached = self.storage.find(&query).await?;
        if !cached.is_empty() {
            debug!("Cache hit: {} articles for {:?}", cached.len(), filter);
            return Ok(Reconciled {
                articles: cached,
                origin: Origin::Cache,
            });
        }
        debug!("Cache miss for {:?}", filter);

        let provider = self.provider.as_ref().ok_or_else(|| {
            Error::Configuration("No news provider credential is configured".to_string())
        })?;
        let fetched = self.fetch_through(&**provider, filter, page).await?;

        if !fetched.is_empty() {
            let fetched_at = Utc::now();
            let records = fetched
                .into_iter()
                .map(|article| StoredArticle::new(article, fetched_at, filter.clone()))
                .collect::<Vec<_>>();
            let summary = self.storage.upsert_many(&records).await?;
            if summary.failed > 0 {
                warn!("{} of {} articles from {} could not be stored", summary.failed, records.len(), provider.name());
            }
            info!("💾 Stored {} articles from {}", summary.upserted, provider.name());
        }

        // Serve the store's view, not the raw payload, so the same
        // constraints apply on both paths.
        let articles = self.storage.find(&query).await?;
        Ok(Reconciled {
            articles,
            origin: Origin::Remote,
        })
    }

    /// Fetches every provider result up to the end of `page`, so the requery
    /// offset lands on stored articles.
    async fn fetch_through(
        &self,
        provider: &dyn NewsProvider,
        filter: &CanonicalFilter,
        page: Pagination,
    ) -> Result<Vec<Article>> {
        let mut fetched = Vec::new();
        for window in page.covering_pages() {
            let batch = match provider.fetch_articles(filter, &window).await {
                Ok(batch) => batch,
                Err(e) if !fetched.is_empty() => {
                    warn!("Stopped paging {} after {} articles: {}", provider.name(), fetched.len(), e);
                    break;
                }
                Err(e) => return Err(e),
            };
            let exhausted = batch.len() < window.page_size as usize;
            fetched.extend(batch);
            if exhausted {
                break;
            }
        }
        Ok(fetched)
    }
}
