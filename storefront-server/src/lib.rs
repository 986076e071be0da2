//! Storefront Server - 电商商城后端
//!
//! # 架构概述
//!
//! 本模块是商城后端的主入口，提供以下核心功能：
//!
//! - **下单** (`services/checkout`): 从购物车生成订单并原子扣减库存
//! - **支付对账** (`services/settlement`): 网关回跳验签、恰好一次入账
//! - **数据库** (`db`): SQLite (WAL) 存储订单、库存、用户
//! - **KV 存储** (`kv`): redb 存储购物车、浏览历史、短信验证码
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! storefront-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、密码哈希
//! ├── services/      # 下单、对账、网关、短信
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 错误、日志等工具
//! ├── db/            # SQLite 数据库层
//! └── kv/            # redb KV 存储层
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod kv;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
   _____ __                  ____                 __
  / ___// /_____  ________  / __/________  ____  / /_
  \__ \/ __/ __ \/ ___/ _ \/ /_/ ___/ __ \/ __ \/ __/
 ___/ / /_/ /_/ / /  /  __/ __/ /  / /_/ / / / / /_
/____/\__/\____/_/   \___/_/ /_/   \____/_/ /_/\__/
    "#
    );
}

/// 设置运行环境: dotenv + 日志
///
/// 必须在读取 [`Config`] 之前调用，否则 .env 里的变量不生效。
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    // .env 不存在不算错误 (生产环境用真实环境变量)
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}
