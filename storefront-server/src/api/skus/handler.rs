//! SKU API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::sku;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{SkuOrdering, SkuView};

#[derive(Deserialize)]
pub struct ListQuery {
    pub category_id: i64,
    /// create_time (默认) | price | sales
    pub ordering: Option<String>,
}

/// GET /api/skus?category_id=3&ordering=price - 分类商品列表 (仅上架)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<SkuView>>> {
    let ordering = SkuOrdering::from_param(query.ordering.as_deref());
    let skus = sku::find_by_category(&state.pool, query.category_id, ordering).await?;
    Ok(Json(skus.into_iter().map(SkuView::from).collect()))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// GET /api/skus/search?q=xxx - 按名称/副标题搜索
pub async fn search(
    State(state): State<ServerState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<SkuView>>> {
    let skus = sku::search(&state.pool, &query.q).await?;
    Ok(Json(skus.into_iter().map(SkuView::from).collect()))
}

/// GET /api/skus/{id} - 商品详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<SkuView>> {
    let item = sku::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::SkuNotFound, format!("Sku {} not found", id))
    })?;
    Ok(Json(SkuView::from(item)))
}
