//! Payment API Handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{PaymentUrlView, SettlementRequest, TradeView};

/// GET /api/payments/{order_id}/url - 网关跳转地址
///
/// 只对当前用户的待支付在线单签发；现金单和已结算单查不到。
pub async fn payment_url(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(order_id): Path<String>,
) -> AppResult<Json<PaymentUrlView>> {
    let view = state.settlement.payment_url(current_user.id, &order_id).await?;
    Ok(Json(view))
}

/// PUT /api/payments/settlement - 网关回跳对账
///
/// 验签后把订单从 UNPAID 推进到 UNSEND 并落支付记录，整体恰好一次；
/// 重放的回调拿不到第二次状态推进。
pub async fn settle(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<SettlementRequest>,
) -> AppResult<Json<TradeView>> {
    let trade = state.settlement.settle(current_user.id, &payload).await?;
    Ok(Json(trade))
}
