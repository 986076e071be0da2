//! 短信验证码路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/sms_codes/{mobile} | POST | 发送注册验证码 | 无 |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/sms_codes/{mobile}", post(handler::send_sms_code))
}
