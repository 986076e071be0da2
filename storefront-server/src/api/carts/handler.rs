//! Cart API Handlers
//!
//! 所有修改操作都返回修改后的完整购物车，客户端直接重渲染。

use axum::{Json, extract::Extension, extract::State};
use serde::Deserialize;
use std::collections::HashMap;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::sku;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{CartItemUpsert, CartItemView, CartSelection, SkuView};

/// 购物车行联上商品数据；商品已下架/删除的行跳过不展示
async fn cart_view(state: &ServerState, user_id: i64) -> Result<Vec<CartItemView>, AppError> {
    let items = state.cart.list(user_id)?;
    let ids: Vec<i64> = items.iter().map(|i| i.sku_id).collect();
    let skus = sku::find_many(&state.pool, &ids).await?;
    let by_id: HashMap<i64, SkuView> = skus.into_iter().map(|s| (s.id, SkuView::from(s))).collect();

    Ok(items
        .into_iter()
        .filter_map(|item| {
            by_id.get(&item.sku_id).map(|sku| CartItemView {
                sku: sku.clone(),
                count: item.count,
                selected: item.selected,
            })
        })
        .collect())
}

/// GET /api/carts - 购物车内容
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<CartItemView>>> {
    Ok(Json(cart_view(&state, current_user.id).await?))
}

/// POST /api/carts - 加购；已有行累加数量
pub async fn add(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CartItemUpsert>,
) -> AppResult<Json<Vec<CartItemView>>> {
    if payload.count < 1 {
        return Err(AppError::validation("count: must be at least 1"));
    }
    sku::find_by_id(&state.pool, payload.sku_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::SkuNotFound,
                format!("Sku {} not found", payload.sku_id),
            )
        })?;

    state
        .cart
        .add_item(current_user.id, payload.sku_id, payload.count, payload.selected)?;

    Ok(Json(cart_view(&state, current_user.id).await?))
}

/// PUT /api/carts - 覆盖某行数量和勾选状态
pub async fn set(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CartItemUpsert>,
) -> AppResult<Json<Vec<CartItemView>>> {
    if payload.count < 1 {
        return Err(AppError::validation("count: must be at least 1"));
    }

    let found = state.cart.set_item(
        current_user.id,
        payload.sku_id,
        payload.count,
        payload.selected,
    )?;
    if !found {
        return Err(AppError::with_message(
            ErrorCode::CartItemNotFound,
            format!("Sku {} is not in the cart", payload.sku_id),
        ));
    }

    Ok(Json(cart_view(&state, current_user.id).await?))
}

#[derive(Deserialize)]
pub struct RemoveItem {
    pub sku_id: i64,
}

/// DELETE /api/carts - 删除某行 (重复删除是幂等的)
pub async fn remove(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<RemoveItem>,
) -> AppResult<Json<Vec<CartItemView>>> {
    state.cart.remove_item(current_user.id, payload.sku_id)?;
    Ok(Json(cart_view(&state, current_user.id).await?))
}

/// PUT /api/carts/selection - 全选/全不选
pub async fn select_all(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CartSelection>,
) -> AppResult<Json<Vec<CartItemView>>> {
    state.cart.select_all(current_user.id, payload.selected)?;
    Ok(Json(cart_view(&state, current_user.id).await?))
}
