use nb_core::{ArticleStorage, Result};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use crate::create_storage;

/// The process-wide store connection. The first caller of [`SharedStorage::get`]
/// connects; concurrent callers wait on that same attempt. A failed attempt
/// leaves the cell empty so the next caller retries.
pub struct SharedStorage {
    database_url: String,
    cell: OnceCell<Arc<dyn ArticleStorage>>,
}

impl fmt::Debug for SharedStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStorage")
            .field("database_url", &self.database_url)
            .field("connected", &self.cell.initialized())
            .finish()
    }
}

impl SharedStorage {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            cell: OnceCell::new(),
        }
    }

    /// Wrap an already-open backend.
    pub fn from_storage(storage: Arc<dyn ArticleStorage>) -> Self {
        Self {
            database_url: format!("{}://", storage.name()),
            cell: OnceCell::new_with(Some(storage)),
        }
    }

    pub async fn get(&self) -> Result<Arc<dyn ArticleStorage>> {
        self.cell
            .get_or_try_init(|| create_storage(&self.database_url))
            .await
            .cloned()
    }

    pub fn is_connected(&self) -> bool {
        self.cell.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use crate::InMemoryStorage;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_connection() {
        let shared = SharedStorage::new("memory://");
        assert!(!shared.is_connected());

        let handles = join_all((0..8).map(|_| shared.get())).await;
        let first = handles[0].as_ref().unwrap();
        for handle in &handles {
            assert!(Arc::ptr_eq(first, handle.as_ref().unwrap()));
        }
        assert!(shared.is_connected());
    }

    #[tokio::test]
    async fn test_failed_connect_is_retried() {
        let shared = SharedStorage::new("bogus://");
        assert!(shared.get().await.is_err());
        assert!(!shared.is_connected());
    }

    #[tokio::test]
    async fn test_from_storage_is_already_connected() {
        let storage: Arc<dyn ArticleStorage> = Arc::new(InMemoryStorage::new());
        let shared = SharedStorage::from_storage(storage.clone());
        assert!(shared.is_connected());
        assert!(Arc::ptr_eq(&storage, &shared.get().await.unwrap()));
    }
}
