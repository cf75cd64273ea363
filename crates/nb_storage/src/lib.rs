use async_trait::async_trait;
use nb_core::{ArticleStorage, Error, Result};
use std::sync::Arc;
use tracing::info;
use url::Url;

pub mod backends;
pub mod shared;

pub use backends::*;
pub use shared::SharedStorage;

/// A storage backend that can be opened from a connection string.
#[async_trait]
pub trait StorageBackend: ArticleStorage + Sized + 'static {
    /// URL scheme that selects this backend.
    const SCHEME: &'static str;

    fn get_error_message() -> &'static str;

    /// Open the backend and make sure the unique index on `url` exists.
    async fn connect(url: &str) -> Result<Self>;
}

/// Open the backend named by the scheme of `database_url`
/// (`memory://`, `sqlite://path.db`).
pub async fn create_storage(database_url: &str) -> Result<Arc<dyn ArticleStorage>> {
    let scheme = scheme(database_url)?;

    if scheme == InMemoryStorage::SCHEME {
        return open::<InMemoryStorage>(database_url).await;
    }
    #[cfg(feature = "sqlite")]
    {
        if scheme == SQLiteStorage::SCHEME {
            return open::<SQLiteStorage>(database_url).await;
        }
    }

    Err(Error::Configuration(format!("Unsupported storage scheme '{}'", scheme)))
}

async fn open<T: StorageBackend>(database_url: &str) -> Result<Arc<dyn ArticleStorage>> {
    let storage = T::connect(database_url).await.map_err(|e| match e {
        Error::Storage(message) => Error::Storage(format!("{} ({})", T::get_error_message(), message)),
        other => other,
    })?;
    info!("🏦 Storage backend initialized (using {})", storage.name());
    let storage: Arc<dyn ArticleStorage> = Arc::new(storage);
    Ok(storage)
}

fn scheme(database_url: &str) -> Result<String> {
    Url::parse(database_url)
        .map(|url| url.scheme().to_string())
        .map_err(|e| Error::Configuration(format!("Invalid DATABASE_URL '{}': {}", database_url, e)))
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, SharedStorage, StorageBackend};
}
