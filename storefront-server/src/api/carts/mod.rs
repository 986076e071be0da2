//! 购物车路由 (需登录)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/carts | GET | 购物车内容 (联商品数据) |
//! | /api/carts | POST | 加购 (已有行累加数量) |
//! | /api/carts | PUT | 覆盖某行数量/勾选 |
//! | /api/carts | DELETE | 删除某行 |
//! | /api/carts/selection | PUT | 全选/全不选 |

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/carts", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/",
            get(handler::list)
                .post(handler::add)
                .put(handler::set)
                .delete(handler::remove),
        )
        .route("/selection", put(handler::select_all))
}
