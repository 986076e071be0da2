//! 订单路由 (需登录)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/orders | POST | 从已勾选购物车下单 (扣库存) |
//! | /api/orders | GET | 当前用户订单列表 (新的在前) |
//! | /api/orders/{order_id} | GET | 订单详情 |

mod handler;

use axum::{
    Router,
    routing::get,
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::place))
        .route("/{order_id}", get(handler::get_by_id))
}
