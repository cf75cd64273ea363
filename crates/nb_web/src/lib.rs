use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod reconciler;
pub mod response;
pub mod state;

pub use reconciler::{Origin, Reconciled, Reconciler};
pub use response::{ApiError, NewsResponse};
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/news", get(handlers::get_news))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use nb_core::{Error, Result, StoredArticle};
    pub use crate::{create_app, AppState, NewsResponse, Reconciler};
}
