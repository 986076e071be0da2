//! 支付路由 (需登录)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/payments/{order_id}/url | GET | 网关跳转地址 (仅待支付的在线单) |
//! | /api/payments/settlement | PUT | 网关回跳对账 (幂等) |

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{order_id}/url", get(handler::payment_url))
        .route("/settlement", put(handler::settle))
}
