//! Order API Handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{address, order};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{OrderView, PlaceOrderRequest};

/// POST /api/orders - 从已勾选购物车下单
///
/// 订单按 id 引用地址 (不做快照)；地址必须属于当前用户且未删除。
/// 库存扣减、订单写入、合计校验都在下单服务的事务里完成。
pub async fn place(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<Json<OrderView>> {
    address::find_by_id_for_user(&state.pool, payload.address_id, current_user.id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::AddressNotFound,
                format!("Address {} not found", payload.address_id),
            )
        })?;

    let view = state
        .checkout
        .place_order(current_user.id, payload.address_id, payload.pay_method)
        .await?;

    tracing::info!(
        order_id = %view.order_id,
        user_id = current_user.id,
        total_amount = %view.total_amount,
        "Order placed"
    );

    Ok(Json(view))
}

/// GET /api/orders - 当前用户订单列表 (新的在前, 含明细行)
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<OrderView>>> {
    let headers = order::list_by_user(&state.pool, current_user.id).await?;

    let mut views = Vec::with_capacity(headers.len());
    for header in headers {
        let lines = order::find_lines(&state.pool, &header.order_id).await?;
        views.push(OrderView::from_parts(header, lines));
    }

    Ok(Json(views))
}

/// GET /api/orders/{order_id} - 订单详情 (只能看自己的)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(order_id): Path<String>,
) -> AppResult<Json<OrderView>> {
    let header = order::find_by_id_for_user(&state.pool, &order_id, current_user.id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::OrderNotFound,
                format!("Order {} not found", order_id),
            )
        })?;

    let lines = order::find_lines(&state.pool, &header.order_id).await?;

    Ok(Json(OrderView::from_parts(header, lines)))
}
