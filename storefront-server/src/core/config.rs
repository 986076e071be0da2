use crate::auth::JwtConfig;

/// 服务器配置 - 商城后端的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/storefront | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | DATABASE_PATH | {WORK_DIR}/storefront.db | SQLite 数据库文件 |
/// | KV_PATH | {WORK_DIR}/storefront.redb | 购物车/验证码 KV 存储文件 |
/// | ENVIRONMENT | development | 运行环境 |
/// | GATEWAY_URL | https://openapi.alipaydev.com/gateway.do | 支付网关地址 (沙箱) |
/// | GATEWAY_SECRET | storefront-sandbox-secret | 支付网关签名密钥 |
/// | SMS_CODE_TTL_SECS | 300 | 短信验证码有效期(秒) |
/// | SMS_SEND_COOLDOWN_SECS | 60 | 同一手机号重发间隔(秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/storefront HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// SQLite 数据库文件路径 (订单、库存、用户)
    pub database_path: String,
    /// redb KV 文件路径 (购物车、浏览历史、短信验证码)
    pub kv_path: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === 支付网关 ===
    /// 网关跳转地址 (沙箱或生产)
    pub gateway_url: String,
    /// 回调签名密钥
    pub gateway_secret: String,

    // === 短信验证码 ===
    /// 验证码有效期 (秒)
    pub sms_code_ttl_secs: i64,
    /// 重发冷却时间 (秒)
    pub sms_send_cooldown_secs: i64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/storefront".into());
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| format!("{work_dir}/storefront.db")),
            kv_path: std::env::var("KV_PATH")
                .unwrap_or_else(|_| format!("{work_dir}/storefront.redb")),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            gateway_url: std::env::var("GATEWAY_URL")
                .unwrap_or_else(|_| "https://openapi.alipaydev.com/gateway.do".into()),
            gateway_secret: std::env::var("GATEWAY_SECRET")
                .unwrap_or_else(|_| "storefront-sandbox-secret".into()),

            sms_code_ttl_secs: std::env::var("SMS_CODE_TTL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(300),
            sms_send_cooldown_secs: std::env::var("SMS_SEND_COOLDOWN_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(60),

            work_dir,
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景：数据库和 KV 文件跟随新的工作目录
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.database_path = format!("{}/storefront.db", config.work_dir);
        config.kv_path = format!("{}/storefront.redb", config.work_dir);
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
