//! User API 模块
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/users | POST | 注册 | 无 |
//! | /api/users/username/{username}/count | GET | 用户名占用查询 | 无 |
//! | /api/users/mobile/{mobile}/count | GET | 手机号占用查询 | 无 |
//! | /api/users/email | PUT | 绑定邮箱并发送验证链接 | JWT |
//! | /api/users/email/verification | GET | 邮箱验证回跳 (令牌在查询串) | 无 |
//! | /api/users/browse_histories | GET/POST | 浏览历史 | JWT |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::register))
        .route("/username/{username}/count", get(handler::username_count))
        .route("/mobile/{mobile}/count", get(handler::mobile_count))
        .route("/email", put(handler::update_email))
        .route("/email/verification", get(handler::verify_email))
        .route(
            "/browse_histories",
            get(handler::browse_histories).post(handler::push_browse_history),
        )
}
