//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查接口
//! - [`auth`] - 登录/当前用户接口
//! - [`users`] - 注册、可用性查询、邮箱、浏览历史接口
//! - [`verifications`] - 短信验证码接口
//! - [`skus`] - 商品浏览/搜索接口
//! - [`carts`] - 购物车接口
//! - [`orders`] - 下单/订单查询接口
//! - [`addresses`] - 收货地址接口
//! - [`payments`] - 支付跳转/对账回调接口

pub mod auth;
pub mod health;

// Account APIs
pub mod addresses;
pub mod users;
pub mod verifications;

// Storefront APIs
pub mod carts;
pub mod orders;
pub mod payments;
pub mod skus;

use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult};

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        // Core APIs
        .merge(health::router())
        .merge(auth::router())
        // Account APIs
        .merge(users::router())
        .merge(verifications::router())
        .merge(addresses::router())
        // Storefront APIs
        .merge(skus::router())
        .merge(carts::router())
        .merge(orders::router())
        .merge(payments::router())
}

/// Build the complete application with middleware and state
pub fn routes(state: ServerState) -> Router {
    build_app()
        // JWT 认证中间件 - 在 Router 级别应用，require_auth 内部会跳过公共路由
        // 使用 from_fn_with_state 以便中间件可以访问 ServerState
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        // Tower HTTP 中间件
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        // HTTP 请求日志中间件
        .layer(middleware::from_fn(log_request))
}
