//! 收货地址路由 (需登录)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/addresses | GET | 有效地址列表 |
//! | /api/addresses | POST | 新增 (每用户上限 20 条) |
//! | /api/addresses/{id} | PUT | 整体更新 |
//! | /api/addresses/{id} | DELETE | 逻辑删除 (订单继续引用) |
//! | /api/addresses/{id}/default | PUT | 设为默认 |
//! | /api/addresses/{id}/title | PUT | 只改标签 |

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/addresses", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/default", put(handler::set_default))
        .route("/{id}/title", put(handler::update_title))
}
