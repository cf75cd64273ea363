pub mod config;
pub mod error;
pub mod filter;
pub mod provider;
pub mod query;
pub mod storage;
pub mod types;

pub use config::AppConfig;
pub use error::Error;
pub use filter::{CanonicalFilter, Pagination, RawNewsQuery, DEFAULT_COUNTRY};
pub use provider::NewsProvider;
pub use query::{ArticlePredicate, ArticleQuery, Constraint, ProvenanceField};
pub use storage::{ArticleStorage, UpsertSummary};
pub use types::{Article, ArticleSource, StoredArticle};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::{
        Article, ArticleQuery, ArticleStorage, CanonicalFilter, Error, NewsProvider, Pagination,
        Result, StoredArticle,
    };
}
