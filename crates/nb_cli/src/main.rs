use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use nb_core::config::{DEFAULT_NEWS_API_URL, DEFAULT_TIMEOUT_SECS};
use nb_core::{AppConfig, ArticleStorage, CanonicalFilter, NewsProvider, Pagination, RawNewsQuery};
use nb_newsapi::{NewsApiClient, NewsApiConfig};
use nb_storage::SharedStorage;
use nb_web::{create_app, AppState, NewsResponse, Reconciler};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(author, version, about = "Cached headline search over NewsAPI", long_about = None)]
pub struct Cli {
    /// Article store connection string (sqlite://path.db or memory://)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    /// NewsAPI credential. Without it only cached articles are served.
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    news_api_key: Option<String>,
    #[arg(long, env = "NEWS_API_URL", default_value = DEFAULT_NEWS_API_URL)]
    news_api_url: String,
    /// Timeout for each NewsAPI request, in seconds
    #[arg(long, env = "NEWS_API_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve GET /api/news over HTTP
    Serve {
        #[arg(long, env = "NB_BIND", default_value = "0.0.0.0:3000")]
        bind: SocketAddr,
    },
    /// Run a single query and print the JSON response
    Fetch(FetchArgs),
}

#[derive(Args, Debug, Default)]
struct FetchArgs {
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// Free-text search term
    #[arg(long)]
    q: Option<String>,
    #[arg(long)]
    language: Option<String>,
    /// Comma-separated source ids
    #[arg(long)]
    sources: Option<String>,
    /// First day, YYYY-MM-DD
    #[arg(long)]
    from: Option<String>,
    /// Last day (inclusive), YYYY-MM-DD
    #[arg(long)]
    to: Option<String>,
    #[arg(long)]
    page: Option<String>,
    #[arg(long)]
    limit: Option<String>,
}

impl From<FetchArgs> for RawNewsQuery {
    fn from(args: FetchArgs) -> Self {
        Self {
            country: args.country,
            category: args.category,
            q: args.q,
            language: args.language,
            sources: args.sources,
            from: args.from,
            to: args.to,
            page: args.page,
            limit: args.limit,
        }
    }
}

impl Cli {
    fn app_config(&self) -> AppConfig {
        AppConfig {
            database_url: self.database_url.clone(),
            news_api_key: self.news_api_key.clone(),
            news_api_url: self.news_api_url.clone(),
            request_timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();
}

fn create_provider(config: &AppConfig) -> nb_core::Result<Option<Arc<dyn NewsProvider>>> {
    match NewsApiConfig::from_app_config(config) {
        Some(api_config) => {
            let client = NewsApiClient::new(api_config)?;
            info!("📰 News provider initialized ({})", client.name());
            let provider: Arc<dyn NewsProvider> = Arc::new(client);
            Ok(Some(provider))
        }
        None => {
            warn!("NEWS_API_KEY is not set; cache misses will fail");
            Ok(None)
        }
    }
}

async fn serve(bind: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("🚀 Listening on http://{}", bind);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("Server error")
}

async fn fetch(
    args: FetchArgs,
    storage: Arc<dyn ArticleStorage>,
    provider: Option<Arc<dyn NewsProvider>>,
) -> anyhow::Result<()> {
    let raw = RawNewsQuery::from(args);
    let filter = CanonicalFilter::normalize(&raw)?;
    let page = Pagination::normalize(&raw)?;

    let reconciled = Reconciler::new(storage, provider).reconcile(&filter, page).await?;
    info!("🗞️ {} articles ({:?})", reconciled.articles.len(), reconciled.origin);

    println!("{}", serde_json::to_string_pretty(&NewsResponse::ok(reconciled.articles))?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.app_config();
    let storage = SharedStorage::new(config.database_url()?);

    info!("💾 Checking storage connection...");
    let store = storage.get().await.context("Failed to connect to the article store")?;
    info!("✨ Storage initialized successfully ({} cached articles)", store.count().await?);

    let provider = create_provider(&config)?;

    match cli.command {
        Commands::Serve { bind } => serve(bind, AppState::new(storage, provider)).await,
        Commands::Fetch(args) => fetch(args, store, provider).await,
    }
}
