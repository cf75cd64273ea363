use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use futures_util::stream::{self, StreamExt};
use nb_core::{
    Article, ArticleQuery, ArticleSource, ArticleStorage, Constraint, Error, Result, StoredArticle,
    UpsertSummary,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};
use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        url TEXT NOT NULL,
        title TEXT NOT NULL,
        title_folded TEXT NOT NULL,
        description TEXT,
        url_to_image TEXT,
        author TEXT,
        content TEXT,
        source_id TEXT,
        source_name TEXT NOT NULL,
        published_at TEXT,
        fetched_at TEXT NOT NULL,
        country TEXT NOT NULL,
        category TEXT,
        language TEXT,
        sources TEXT,
        query_params TEXT NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_articles_url ON articles (url)",
    "CREATE INDEX IF NOT EXISTS idx_articles_published_at ON articles (published_at)",
];

const UPSERT: &str = r#"
    INSERT INTO articles
    (url, title, title_folded, description, url_to_image, author, content, source_id,
     source_name, published_at, fetched_at, country, category, language, sources, query_params)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(url) DO UPDATE SET
        title = excluded.title,
        title_folded = excluded.title_folded,
        description = excluded.description,
        url_to_image = excluded.url_to_image,
        author = excluded.author,
        content = excluded.content,
        source_id = excluded.source_id,
        source_name = excluded.source_name,
        published_at = excluded.published_at,
        fetched_at = excluded.fetched_at,
        country = excluded.country,
        category = excluded.category,
        language = excluded.language,
        sources = excluded.sources,
        query_params = excluded.query_params
"#;

const UPSERT_CONCURRENCY: usize = 8;

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    const SCHEME: &'static str = "sqlite";

    fn get_error_message() -> &'static str {
        "SQLite database should be reachable at DATABASE_URL"
    }

    async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| Error::Configuration(format!("Invalid sqlite url: {}", e)))?;
        Self::connect_with(options).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        Self::connect_with(SqliteConnectOptions::new().filename(db_path)).await
    }

    async fn connect_with(options: SqliteConnectOptions) -> Result<Self> {
        let db_path = options.clone().get_filename().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(storage_error("Failed to connect to database"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Storage(format!("Failed to run migration {}: {}", i, e)))?;
        }

        debug!("Opened sqlite database at {}", db_path.display());

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn upsert_one(&self, stored: &StoredArticle) -> Result<()> {
        let article = &stored.article;
        let provenance = &stored.query_params;
        let query_params = serde_json::to_string(provenance)?;

        sqlx::query(UPSERT)
            .bind(&article.url)
            .bind(&article.title)
            .bind(article.title.to_lowercase())
            .bind(article.description.as_deref())
            .bind(article.url_to_image.as_deref())
            .bind(article.author.as_deref())
            .bind(article.content.as_deref())
            .bind(article.source.id.as_deref())
            .bind(&article.source.name)
            .bind(article.published_at.as_ref().map(timestamp))
            .bind(timestamp(&stored.fetched_at))
            .bind(&provenance.country)
            .bind(provenance.category.as_deref())
            .bind(provenance.language.as_deref())
            .bind(provenance.sources.as_deref())
            .bind(query_params)
            .execute(&*self.pool)
            .await
            .map_err(storage_error("Failed to store article"))?;

        Ok(())
    }
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn find(&self, query: &ArticleQuery) -> Result<Vec<StoredArticle>> {
        let mut builder = select(query);
        let rows = builder
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(storage_error("Failed to query articles"))?;

        rows.iter().map(decode).collect()
    }

    async fn upsert_many(&self, articles: &[StoredArticle]) -> Result<UpsertSummary> {
        let pending = articles
            .iter()
            .map(|article| async move { (article.url(), self.upsert_one(article).await) })
            .collect::<Vec<_>>();
        let results = stream::iter(pending)
            .buffer_unordered(UPSERT_CONCURRENCY)
            .collect::<Vec<_>>()
            .await;

        let mut summary = UpsertSummary::default();
        for (url, result) in results {
            match result {
                Ok(()) => summary.upserted += 1,
                Err(e) => {
                    warn!("Failed to upsert {}: {}", url, e);
                    summary.failed += 1;
                }
            }
        }
        debug!("Upserted {} articles ({} failed)", summary.upserted, summary.failed);
        Ok(summary)
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&*self.pool)
            .await
            .map_err(storage_error("Failed to count articles"))?;
        Ok(count as usize)
    }
}

/// One bound comparison in a WHERE clause: `prefix ? suffix`.
struct Clause {
    prefix: String,
    value: String,
    suffix: &'static str,
}

fn clauses(constraint: &Constraint) -> Vec<Clause> {
    match constraint {
        Constraint::Equals { field, value } => vec![Clause {
            prefix: format!("{} = ", field.column()),
            value: value.clone(),
            suffix: "",
        }],
        // sqlite's lower() folds ASCII only, so titles are folded on write
        Constraint::TitleContains(needle) => vec![Clause {
            prefix: "instr(title_folded, ".to_string(),
            value: needle.to_lowercase(),
            suffix: ") > 0",
        }],
        Constraint::FetchedBetween { from, before } => {
            let mut out = Vec::new();
            if let Some(from) = from {
                out.push(Clause {
                    prefix: "fetched_at >= ".to_string(),
                    value: timestamp(from),
                    suffix: "",
                });
            }
            if let Some(before) = before {
                out.push(Clause {
                    prefix: "fetched_at < ".to_string(),
                    value: timestamp(before),
                    suffix: "",
                });
            }
            out
        }
    }
}

fn select(query: &ArticleQuery) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new("SELECT * FROM articles");

    let where_clauses = query.predicate.constraints.iter().flat_map(clauses);
    for (i, clause) in where_clauses.enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder.push(clause.prefix);
        builder.push_bind(clause.value);
        builder.push(clause.suffix);
    }

    builder.push(" ORDER BY published_at DESC, url ASC LIMIT ");
    builder.push_bind(i64::from(query.page.page_size));
    builder.push(" OFFSET ");
    builder.push_bind(query.page.offset() as i64);
    builder
}

fn decode(row: &SqliteRow) -> Result<StoredArticle> {
    let query_params: String = row.try_get("query_params").map_err(storage_error("Bad query_params"))?;
    let published_at: Option<String> = row.try_get("published_at").map_err(storage_error("Bad published_at"))?;
    let fetched_at: String = row.try_get("fetched_at").map_err(storage_error("Bad fetched_at"))?;

    Ok(StoredArticle {
        article: Article {
            url: row.try_get("url").map_err(storage_error("Bad url"))?,
            title: row.try_get("title").map_err(storage_error("Bad title"))?,
            description: row.try_get("description").map_err(storage_error("Bad description"))?,
            url_to_image: row.try_get("url_to_image").map_err(storage_error("Bad url_to_image"))?,
            author: row.try_get("author").map_err(storage_error("Bad author"))?,
            content: row.try_get("content").map_err(storage_error("Bad content"))?,
            source: ArticleSource {
                id: row.try_get("source_id").map_err(storage_error("Bad source_id"))?,
                name: row.try_get("source_name").map_err(storage_error("Bad source_name"))?,
            },
            published_at: published_at.as_deref().map(parse_timestamp).transpose()?,
        },
        fetched_at: parse_timestamp(&fetched_at)?,
        query_params: serde_json::from_str(&query_params)?,
    })
}

/// Fixed-width RFC 3339 so text comparison orders like time.
fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("Failed to parse date '{}': {}", value, e)))
}

fn storage_error(context: &'static str) -> impl Fn(sqlx::Error) -> Error {
    move |e| Error::Storage(format!("{}: {}", context, e))
}
