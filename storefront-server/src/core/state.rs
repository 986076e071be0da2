use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::kv::{self, CartStore, HistoryStore, VerifyCodeStore};
use crate::services::{
    CheckoutService, LogSmsNotifier, PaymentGateway, SandboxGateway, SettlementService,
    SmsNotifier,
};
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是商城后端的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc / 连接池实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 (订单、库存、用户) |
/// | cart | CartStore | 购物车 KV 存储 |
/// | history | HistoryStore | 浏览历史 KV 存储 |
/// | verify_codes | VerifyCodeStore | 短信验证码 KV 存储 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | checkout | CheckoutService | 下单服务 (库存扣减) |
/// | settlement | SettlementService | 支付对账服务 |
/// | sms | Arc<dyn SmsNotifier> | 短信通知器 |
///
/// # 使用示例
///
/// ```ignore
/// // 获取数据库连接池
/// let db = state.get_db();
///
/// // 下单
/// let order = state.checkout.place_order(user_id, address_id, pay_method).await?;
/// ```
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// 购物车存储
    pub cart: CartStore,
    /// 浏览历史存储
    pub history: HistoryStore,
    /// 短信验证码存储
    pub verify_codes: VerifyCodeStore,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 下单服务
    pub checkout: CheckoutService,
    /// 支付对账服务
    pub settlement: SettlementService,
    /// 短信通知器
    pub sms: Arc<dyn SmsNotifier>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize()`] 方法代替
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        pool: SqlitePool,
        cart: CartStore,
        history: HistoryStore,
        verify_codes: VerifyCodeStore,
        jwt_service: Arc<JwtService>,
        checkout: CheckoutService,
        settlement: SettlementService,
        sms: Arc<dyn SmsNotifier>,
    ) -> Self {
        Self {
            config,
            pool,
            cart,
            history,
            verify_codes,
            jwt_service,
            checkout,
            settlement,
            sms,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录 (确保存在)
    /// 2. SQLite 数据库 + 迁移
    /// 3. KV 存储 (购物车、浏览历史、验证码共用一个文件)
    /// 4. JWT / 支付网关 / 下单 / 对账 / 短信服务
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        // 1. Ensure work_dir exists
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            AppError::internal(format!(
                "Failed to create work directory {}: {e}",
                config.work_dir
            ))
        })?;

        // 2. SQLite (WAL) + migrations
        let db_service = DbService::new(&config.database_path).await?;
        let pool = db_service.pool;

        // 3. KV stores share one redb file
        let kv_db = kv::open_database(&config.kv_path)?;
        let cart = CartStore::open(kv_db.clone())?;
        let history = HistoryStore::open(kv_db.clone())?;
        let verify_codes = VerifyCodeStore::open(kv_db)?;

        // 4. Services
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let gateway: Arc<dyn PaymentGateway> = Arc::new(SandboxGateway::new(
            config.gateway_url.clone(),
            config.gateway_secret.clone(),
        ));
        let checkout = CheckoutService::new(pool.clone(), cart.clone());
        let settlement = SettlementService::new(pool.clone(), gateway);
        let sms: Arc<dyn SmsNotifier> = Arc::new(LogSmsNotifier);

        Ok(Self::new(
            config.clone(),
            pool,
            cart,
            history,
            verify_codes,
            jwt_service,
            checkout,
            settlement,
            sms,
        ))
    }

    /// 获取数据库连接池
    pub fn get_db(&self) -> SqlitePool {
        self.pool.clone()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
