//! Payment settlement
//!
//! Consumes gateway callbacks for orders the checkout created. The
//! guarded status update and the payment record ride one transaction,
//! so a replayed callback matches zero rows and writes nothing.

use super::gateway::PaymentGateway;
use crate::db::repository::{RepoError, order, payment};
use shared::models::{OrderStatus, PaymentUrlView, SettlementRequest, TradeView};
use shared::util::to_decimal;
use shared::{AppError, ErrorCode};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettlementError {
    /// Order missing, not the caller's, wrong pay method, or not UNPAID
    #[error("invalid order reference: {0}")]
    InvalidOrderReference(String),

    #[error("callback signature verification failed")]
    BadSignature,

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<SettlementError> for AppError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::InvalidOrderReference(order_id) => {
                AppError::invalid_order_reference(order_id)
            }
            SettlementError::BadSignature => AppError::new(ErrorCode::SignatureInvalid),
            SettlementError::Repo(e) => e.into(),
        }
    }
}

#[derive(Clone)]
pub struct SettlementService {
    pool: SqlitePool,
    gateway: Arc<dyn PaymentGateway>,
}

impl SettlementService {
    pub fn new(pool: SqlitePool, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { pool, gateway }
    }

    /// Redirect URL for an unpaid online order of this user
    pub async fn payment_url(
        &self,
        user_id: i64,
        order_id: &str,
    ) -> Result<PaymentUrlView, SettlementError> {
        let order = order::find_by_id_for_user(&self.pool, order_id, user_id)
            .await?
            .filter(|o| o.pay_method.is_online() && o.status == OrderStatus::Unpaid)
            .ok_or_else(|| SettlementError::InvalidOrderReference(order_id.to_string()))?;

        Ok(PaymentUrlView {
            pay_url: self
                .gateway
                .pay_url(&order.order_id, to_decimal(order.total_amount_cents)),
        })
    }

    /// Reconcile one verified callback: UNPAID → UNSEND plus the payment
    /// record, exactly once.
    pub async fn settle(
        &self,
        user_id: i64,
        req: &SettlementRequest,
    ) -> Result<TradeView, SettlementError> {
        if !self.gateway.verify(&req.order_id, &req.trade_id, &req.sign) {
            tracing::warn!(order_id = %req.order_id, "settlement callback with bad signature");
            return Err(SettlementError::BadSignature);
        }

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;

        let advanced = order::settle_mark_paid(&mut *tx, &req.order_id, user_id).await?;
        if !advanced {
            let _ = tx.rollback().await;
            return Err(SettlementError::InvalidOrderReference(req.order_id.clone()));
        }

        let record = payment::insert(&mut *tx, &req.order_id, &req.trade_id).await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            order_id = %req.order_id,
            trade_id = %req.trade_id,
            "payment settled, order awaiting shipment"
        );
        Ok(TradeView {
            trade_id: record.trade_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::gateway::SandboxGateway;
    use shared::models::{FREIGHT_CENTS, OrderInfo, PayMethod};
    use sha2::{Digest, Sha256};
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    const SECRET: &str = "test-secret";

    async fn test_pool(dir: &tempfile::TempDir) -> SqlitePool {
        let path = dir.path().join("settlement-test.db");
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .unwrap()
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .unwrap();

        for ddl in [
            "CREATE TABLE order_info (
                order_id TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL,
                address_id INTEGER NOT NULL,
                total_count INTEGER NOT NULL DEFAULT 0,
                total_amount_cents INTEGER NOT NULL DEFAULT 0,
                freight_cents INTEGER NOT NULL,
                pay_method TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            "CREATE TABLE payment (
                id INTEGER PRIMARY KEY,
                order_id TEXT NOT NULL UNIQUE,
                trade_id TEXT NOT NULL UNIQUE,
                created_at INTEGER NOT NULL
            )",
        ] {
            sqlx::query(ddl).execute(&pool).await.unwrap();
        }
        pool
    }

    async fn seed_order(pool: &SqlitePool, order_id: &str, user_id: i64, pay_method: PayMethod) {
        let now = shared::util::now_millis();
        let order = OrderInfo {
            order_id: order_id.to_string(),
            user_id,
            address_id: 1,
            total_count: 1,
            total_amount_cents: 6000,
            freight_cents: FREIGHT_CENTS,
            pay_method,
            status: OrderStatus::initial_for(pay_method),
            created_at: now,
            updated_at: now,
        };
        order::insert_header(pool, &order).await.unwrap();
    }

    fn sign_for(order_id: &str, trade_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("order_id={order_id}&trade_id={trade_id}").as_bytes());
        hasher.update(SECRET.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn service(pool: &SqlitePool) -> SettlementService {
        let gateway = Arc::new(SandboxGateway::new(
            "https://sandbox.pay.example.com/gateway".to_string(),
            SECRET.to_string(),
        ));
        SettlementService::new(pool.clone(), gateway)
    }

    fn request(order_id: &str, trade_id: &str) -> SettlementRequest {
        SettlementRequest {
            order_id: order_id.to_string(),
            trade_id: trade_id.to_string(),
            sign: sign_for(order_id, trade_id),
        }
    }

    async fn payment_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM payment")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_settle_advances_once() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        seed_order(&pool, "A1", 7, PayMethod::Alipay).await;

        let settlement = service(&pool);
        let trade = settlement.settle(7, &request("A1", "T-100")).await.unwrap();
        assert_eq!(trade.trade_id, "T-100");

        let stored = order::find_by_id(&pool, "A1").await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Unsend);
        assert_eq!(payment_count(&pool).await, 1);

        // Replay of the exact same callback: rejected, still one record
        let err = settlement.settle(7, &request("A1", "T-100")).await.unwrap_err();
        assert!(matches!(err, SettlementError::InvalidOrderReference(_)));
        assert_eq!(payment_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_settle_guards() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        seed_order(&pool, "A1", 7, PayMethod::Alipay).await;
        seed_order(&pool, "C1", 7, PayMethod::Cash).await;

        let settlement = service(&pool);

        // Wrong owner
        let err = settlement.settle(8, &request("A1", "T-1")).await.unwrap_err();
        assert!(matches!(err, SettlementError::InvalidOrderReference(_)));

        // Cash order was never UNPAID
        let err = settlement.settle(7, &request("C1", "T-2")).await.unwrap_err();
        assert!(matches!(err, SettlementError::InvalidOrderReference(_)));

        // Unknown order
        let err = settlement.settle(7, &request("NOPE", "T-3")).await.unwrap_err();
        assert!(matches!(err, SettlementError::InvalidOrderReference(_)));

        // Tampered signature never reaches the database
        let mut bad = request("A1", "T-4");
        bad.sign = "deadbeef".to_string();
        let err = settlement.settle(7, &bad).await.unwrap_err();
        assert!(matches!(err, SettlementError::BadSignature));

        assert_eq!(payment_count(&pool).await, 0);
        let stored = order::find_by_id(&pool, "A1").await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Unpaid);
    }

    #[tokio::test]
    async fn test_payment_url_only_for_unpaid_online_orders() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        seed_order(&pool, "A1", 7, PayMethod::Alipay).await;
        seed_order(&pool, "C1", 7, PayMethod::Cash).await;

        let settlement = service(&pool);

        let view = settlement.payment_url(7, "A1").await.unwrap();
        assert!(view.pay_url.contains("order_id=A1"));
        assert!(view.pay_url.contains("total_amount=60.00"));

        assert!(matches!(
            settlement.payment_url(8, "A1").await,
            Err(SettlementError::InvalidOrderReference(_))
        ));
        assert!(matches!(
            settlement.payment_url(7, "C1").await,
            Err(SettlementError::InvalidOrderReference(_))
        ));

        // Once settled, the cashier URL is gone too
        settlement.settle(7, &request("A1", "T-100")).await.unwrap();
        assert!(matches!(
            settlement.payment_url(7, "A1").await,
            Err(SettlementError::InvalidOrderReference(_))
        ));
    }
}
