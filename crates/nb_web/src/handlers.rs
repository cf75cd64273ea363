use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use nb_core::{CanonicalFilter, Error, Pagination, RawNewsQuery};
use std::sync::Arc;
use tracing::info;
use crate::response::{ApiError, NewsResponse};
use crate::AppState;

pub async fn get_news(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RawNewsQuery>, QueryRejection>,
) -> Result<Json<NewsResponse>, ApiError> {
    let Query(raw) = query.map_err(|rejection| Error::Validation(rejection.body_text()))?;
    let filter = CanonicalFilter::normalize(&raw)?;
    let page = Pagination::normalize(&raw)?;

    let reconciled = state.reconciler().await?.reconcile(&filter, page).await?;
    info!("🗞️ Serving {} articles ({:?})", reconciled.articles.len(), reconciled.origin);

    Ok(Json(NewsResponse::ok(reconciled.articles)))
}
