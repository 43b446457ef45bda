//! Public article reads / 公开检索接口

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use snowthaw_backend::models::{Card, SearchResponse};
use snowthaw_backend::search::{normalize_query, TypeFilter};

use super::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    /// Comma separated card types / 逗号分隔的类型
    pub types: Option<String>,
}

/// GET /articles/search?q=&types= - 全文检索
pub async fn search_articles(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let query = params.q.unwrap_or_default();
    // Reject blank input before the store is connected
    normalize_query(&query)?;
    let type_filter = params.types.as_deref().map(TypeFilter::parse);

    let engine = state.search_engine().await?;
    let response = engine.search(&query, type_filter).await?;
    Ok(Json(response))
}

/// GET /articles/:id
pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Card>> {
    let store = state.store.get().await?;
    match store.find_by_id(&id).await? {
        Some(card) => Ok(Json(card)),
        None => Err(ApiError::NotFound(format!("Card {} not found", id))),
    }
}
