use async_trait::async_trait;
use nb_core::query::newest_first;
use nb_core::{ArticleQuery, ArticleStorage, Result, StoredArticle, UpsertSummary};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::StorageBackend;

/// Articles keyed by url. The map key is the unique index.
#[derive(Debug, Default)]
pub struct MemoryStore {
    articles: HashMap<String, StoredArticle>,
}

impl MemoryStore {
    pub fn upsert(&mut self, article: &StoredArticle) {
        self.articles.insert(article.url().to_string(), article.clone());
    }

    pub fn find(&self, query: &ArticleQuery) -> Vec<StoredArticle> {
        let mut matching = self.articles
            .values()
            .filter(|article| query.predicate.matches(article))
            .cloned()
            .collect::<Vec<_>>();
        matching.sort_by(|a, b| newest_first(a, b).then_with(|| a.url().cmp(b.url())));
        matching
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.page_size as usize)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    const SCHEME: &'static str = "memory";

    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn connect(_url: &str) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn find(&self, query: &ArticleQuery) -> Result<Vec<StoredArticle>> {
        let store = self.store.read().await;
        Ok(store.find(query))
    }

    async fn upsert_many(&self, articles: &[StoredArticle]) -> Result<UpsertSummary> {
        let mut store = self.store.write().await;
        for article in articles {
            store.upsert(article);
        }
        Ok(UpsertSummary {
            upserted: articles.len(),
            failed: 0,
        })
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.store.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use nb_core::{Article, ArticleSource, CanonicalFilter, Pagination};

    fn stored(url: &str, title: &str, published_at: Option<&str>) -> StoredArticle {
        StoredArticle::new(
            Article {
                url: url.to_string(),
                title: title.to_string(),
                description: None,
                url_to_image: None,
                author: None,
                content: None,
                source: ArticleSource {
                    id: None,
                    name: "Test".to_string(),
                },
                published_at: published_at.map(|p| p.parse::<DateTime<Utc>>().unwrap()),
            },
            Utc::now(),
            CanonicalFilter::default(),
        )
    }

    fn everything() -> ArticleQuery {
        ArticleQuery::new(&CanonicalFilter::default(), Pagination::default())
    }

    #[tokio::test]
    async fn test_upsert_same_url_keeps_one_record() {
        let storage = InMemoryStorage::new();
        storage.upsert_many(&[stored("http://test.com/a", "First title", None)]).await.unwrap();
        storage.upsert_many(&[stored("http://test.com/a", "Second title", None)]).await.unwrap();

        let found = storage.find(&everything()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].article.title, "Second title");
        assert_eq!(storage.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_orders_newest_first_and_pages() {
        let storage = InMemoryStorage::new();
        storage
            .upsert_many(&[
                stored("http://test.com/old", "Old", Some("2024-01-01T00:00:00Z")),
                stored("http://test.com/undated", "Undated", None),
                stored("http://test.com/new", "New", Some("2024-02-01T00:00:00Z")),
            ])
            .await
            .unwrap();

        let titles = storage
            .find(&everything())
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.article.title)
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["New", "Old", "Undated"]);

        let second_page = ArticleQuery::new(&CanonicalFilter::default(), Pagination { page: 2, page_size: 2 });
        let found = storage.find(&second_page).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].article.title, "Undated");
    }
}
