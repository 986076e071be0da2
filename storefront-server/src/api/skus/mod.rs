//! 商品浏览路由 (公共, GET 无需登录)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/skus?category_id=&ordering= | GET | 分类商品列表 |
//! | /api/skus/search?q= | GET | 名称/副标题搜索 |
//! | /api/skus/{id} | GET | 商品详情 |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/skus", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/search", get(handler::search))
        .route("/{id}", get(handler::get_by_id))
}
