//! Checkout orchestration
//!
//! Converts a user's selected cart lines into a durable order while
//! decrementing shared SKU stock under concurrency. Header, lines, stock
//! decrements and totals all ride one explicit transaction — either the
//! whole order commits or none of it does. Stock reads go through the
//! pool, not the transaction, so each retry observes the latest committed
//! value written by competing checkouts.

use crate::db::repository::{order, sku};
use crate::kv::{CartStore, KvError};
use shared::models::{
    FREIGHT_CENTS, OrderInfo, OrderLine, OrderStatus, OrderView, PayMethod, order_id_for,
};
use shared::{AppError, ErrorCode};
use sqlx::{Sqlite, SqlitePool, Transaction};
use thiserror::Error;

/// CAS attempts per line before the checkout gives up
const DECREMENT_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing selected in the cart
    #[error("no selected items in the cart")]
    EmptyCart,

    /// More requested than the shelf holds — user can reduce the quantity
    #[error("insufficient stock for sku {0}")]
    InsufficientStock(i64),

    /// Lost the stock race three times, or an unclassified write/commit
    /// failure — user can simply retry
    #[error("order placement failed: {0}")]
    PlacementFailed(String),

    #[error("cart storage error: {0}")]
    Storage(#[from] KvError),
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::EmptyCart => AppError::new(ErrorCode::CartEmpty),
            CheckoutError::InsufficientStock(sku_id) => AppError::insufficient_stock(sku_id),
            CheckoutError::PlacementFailed(msg) => AppError::placement_failed(msg),
            CheckoutError::Storage(e) => AppError::storage(e.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct CheckoutService {
    pool: SqlitePool,
    cart: CartStore,
}

impl CheckoutService {
    pub fn new(pool: SqlitePool, cart: CartStore) -> Self {
        Self { pool, cart }
    }

    /// Place an order from the user's selected cart lines.
    ///
    /// 步骤: snapshot → header → per-line CAS decrement (≤3 attempts,
    /// fresh read each time) → totals → commit → best-effort cart cleanup.
    pub async fn place_order(
        &self,
        user_id: i64,
        address_id: i64,
        pay_method: PayMethod,
    ) -> Result<OrderView, CheckoutError> {
        let snapshot = self.cart.snapshot(user_id)?;
        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let now = shared::util::now_millis();
        let order_id = order_id_for(user_id, chrono::Utc::now());
        let mut header = OrderInfo {
            order_id: order_id.clone(),
            user_id,
            address_id,
            total_count: 0,
            total_amount_cents: 0,
            freight_cents: FREIGHT_CENTS,
            pay_method,
            status: OrderStatus::initial_for(pay_method),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CheckoutError::PlacementFailed(e.to_string()))?;

        if let Err(e) = order::insert_header(&mut *tx, &header).await {
            let _ = tx.rollback().await;
            return Err(CheckoutError::PlacementFailed(e.to_string()));
        }

        let mut total_count: i64 = 0;
        let mut total_amount_cents: i64 = 0;
        let mut lines: Vec<OrderLine> = Vec::with_capacity(snapshot.selected.len());

        for &sku_id in &snapshot.selected {
            // Malformed quantity fails the checkout like a shelf miss
            let count = match snapshot.quantity_of(sku_id) {
                Some(c) if c > 0 => c,
                _ => {
                    let _ = tx.rollback().await;
                    return Err(CheckoutError::InsufficientStock(sku_id));
                }
            };

            match self.place_line(&mut tx, &order_id, sku_id, count, now).await {
                Ok(line) => {
                    total_count += line.count;
                    total_amount_cents += line.price_cents * line.count;
                    lines.push(line);
                }
                Err(e) => {
                    let _ = tx.rollback().await;
                    return Err(e);
                }
            }
        }

        total_amount_cents += FREIGHT_CENTS;
        if let Err(e) = order::update_totals(&mut *tx, &order_id, total_count, total_amount_cents).await
        {
            let _ = tx.rollback().await;
            return Err(CheckoutError::PlacementFailed(e.to_string()));
        }

        if let Err(e) = tx.commit().await {
            return Err(CheckoutError::PlacementFailed(e.to_string()));
        }

        tracing::info!(
            order_id = %order_id,
            user_id,
            total_count,
            total_amount_cents,
            "order placed"
        );

        // The order is durable; cleanup failure is logged, never surfaced
        let processed: Vec<i64> = snapshot.selected.iter().copied().collect();
        if let Err(e) = self.cart.remove_checked_out(user_id, &processed) {
            tracing::warn!(user_id, error = %e, "cart cleanup failed after commit");
        }

        header.total_count = total_count;
        header.total_amount_cents = total_amount_cents;
        Ok(OrderView::from_parts(header, lines))
    }

    /// One order line: bounded compare-and-swap loop with a fresh stock
    /// read per attempt. Price is frozen from the read that won the swap.
    async fn place_line(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        order_id: &str,
        sku_id: i64,
        count: i64,
        now: i64,
    ) -> Result<OrderLine, CheckoutError> {
        for attempt in 1..=DECREMENT_ATTEMPTS {
            let current = sku::find_by_id(&self.pool, sku_id)
                .await
                .map_err(|e| CheckoutError::PlacementFailed(e.to_string()))?
                .ok_or_else(|| {
                    CheckoutError::PlacementFailed(format!("sku {sku_id} not in catalog"))
                })?;

            // Terminal: the shelf genuinely holds less than requested
            if count > current.stock {
                return Err(CheckoutError::InsufficientStock(sku_id));
            }

            let swapped = sku::conditional_decrement(&mut **tx, sku_id, current.stock, count)
                .await
                .map_err(|e| CheckoutError::PlacementFailed(e.to_string()))?;

            if swapped {
                let line = OrderLine {
                    id: shared::util::snowflake_id(),
                    order_id: order_id.to_string(),
                    sku_id,
                    count,
                    price_cents: current.price_cents,
                    created_at: now,
                };
                order::insert_line(&mut **tx, &line)
                    .await
                    .map_err(|e| CheckoutError::PlacementFailed(e.to_string()))?;
                return Ok(line);
            }

            tracing::debug!(sku_id, attempt, "stock compare-and-swap lost the race");
        }

        Err(CheckoutError::PlacementFailed(format!(
            "sku {sku_id}: stock contention not resolved after {DECREMENT_ATTEMPTS} attempts"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::open_in_memory;
    use rust_decimal::Decimal;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    /// File-backed pool: checkout reads through the pool while a
    /// transaction is open, which needs more than one connection.
    async fn test_pool(dir: &tempfile::TempDir) -> SqlitePool {
        let path = dir.path().join("checkout-test.db");
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .unwrap()
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .pragma("busy_timeout", "5000");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .unwrap();

        for ddl in [
            "CREATE TABLE sku (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                caption TEXT NOT NULL DEFAULT '',
                category_id INTEGER NOT NULL,
                price_cents INTEGER NOT NULL,
                stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
                sales INTEGER NOT NULL DEFAULT 0,
                is_launched INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
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
            "CREATE TABLE order_goods (
                id INTEGER PRIMARY KEY,
                order_id TEXT NOT NULL,
                sku_id INTEGER NOT NULL,
                count INTEGER NOT NULL CHECK (count > 0),
                price_cents INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            )",
        ] {
            sqlx::query(ddl).execute(&pool).await.unwrap();
        }
        pool
    }

    async fn seed_sku(pool: &SqlitePool, id: i64, price_cents: i64, stock: i64) {
        sqlx::query(
            "INSERT INTO sku (id, name, caption, category_id, price_cents, stock, sales, is_launched, created_at, updated_at) VALUES (?1, ?2, '', 1, ?3, ?4, 0, 1, 0, 0)",
        )
        .bind(id)
        .bind(format!("sku-{id}"))
        .bind(price_cents)
        .bind(stock)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn stock_and_sales(pool: &SqlitePool, id: i64) -> (i64, i64) {
        sqlx::query_as::<_, (i64, i64)>("SELECT stock, sales FROM sku WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn order_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_info")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn service(pool: &SqlitePool) -> CheckoutService {
        let cart = CartStore::open(open_in_memory().unwrap()).unwrap();
        CheckoutService::new(pool.clone(), cart)
    }

    #[tokio::test]
    async fn test_scenario_cash_checkout() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        seed_sku(&pool, 1, 5000, 10).await; // 50.00
        seed_sku(&pool, 2, 3000, 5).await; // 30.00

        let checkout = service(&pool);
        checkout.cart.add_item(7, 1, 2, true).unwrap();
        checkout.cart.add_item(7, 2, 1, true).unwrap();

        let view = checkout
            .place_order(7, 1, PayMethod::Cash)
            .await
            .unwrap();

        assert_eq!(view.total_count, 3);
        assert_eq!(view.total_amount, Decimal::from_str("170.00").unwrap());
        assert_eq!(view.freight, Decimal::from_str("10.00").unwrap());
        assert_eq!(view.status, OrderStatus::Unsend);
        assert_eq!(view.lines.len(), 2);

        assert_eq!(stock_and_sales(&pool, 1).await, (8, 2));
        assert_eq!(stock_and_sales(&pool, 2).await, (4, 1));

        // Checked-out lines are gone from the cart
        assert!(checkout.cart.snapshot(7).unwrap().is_empty());
        assert!(checkout.cart.list(7).unwrap().is_empty());

        // Header in the database carries the same totals
        let stored = order::find_by_id(&pool, &view.order_id).await.unwrap().unwrap();
        assert_eq!(stored.total_count, 3);
        assert_eq!(stored.total_amount_cents, 17000);
        assert_eq!(stored.status, OrderStatus::Unsend);
    }

    #[tokio::test]
    async fn test_online_order_starts_unpaid() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        seed_sku(&pool, 1, 5000, 10).await;

        let checkout = service(&pool);
        checkout.cart.add_item(7, 1, 1, true).unwrap();

        let view = checkout
            .place_order(7, 1, PayMethod::Alipay)
            .await
            .unwrap();
        assert_eq!(view.status, OrderStatus::Unpaid);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        let checkout = service(&pool);

        // No cart at all
        assert!(matches!(
            checkout.place_order(7, 1, PayMethod::Cash).await,
            Err(CheckoutError::EmptyCart)
        ));

        // Lines exist but none selected
        checkout.cart.add_item(7, 1, 2, false).unwrap();
        assert!(matches!(
            checkout.place_order(7, 1, PayMethod::Cash).await,
            Err(CheckoutError::EmptyCart)
        ));
        assert_eq!(order_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_everything_back() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        seed_sku(&pool, 1, 5000, 10).await;
        seed_sku(&pool, 2, 3000, 2).await;

        let checkout = service(&pool);
        checkout.cart.add_item(7, 1, 2, true).unwrap();
        checkout.cart.add_item(7, 2, 3, true).unwrap(); // only 2 on the shelf

        let err = checkout.place_order(7, 1, PayMethod::Cash).await.unwrap_err();
        assert!(matches!(err, CheckoutError::InsufficientStock(2)));

        // Nothing persisted: no header, no lines, sku1's decrement undone
        assert_eq!(order_count(&pool).await, 0);
        assert_eq!(stock_and_sales(&pool, 1).await, (10, 0));
        assert_eq!(stock_and_sales(&pool, 2).await, (2, 0));

        // Cart untouched on failure
        assert_eq!(checkout.cart.list(7).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_sku_fails_placement() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        seed_sku(&pool, 1, 5000, 10).await;

        let checkout = service(&pool);
        checkout.cart.add_item(7, 1, 1, true).unwrap();
        checkout.cart.add_item(7, 999, 1, true).unwrap();

        let err = checkout.place_order(7, 1, PayMethod::Cash).await.unwrap_err();
        assert!(matches!(err, CheckoutError::PlacementFailed(_)));
        assert_eq!(order_count(&pool).await, 0);
        assert_eq!(stock_and_sales(&pool, 1).await, (10, 0));
    }

    #[tokio::test]
    async fn test_line_failure_keeps_state_clean() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        seed_sku(&pool, 1, 5000, 10).await;
        seed_sku(&pool, 2, 3000, 5).await;

        // Sabotage line inserts: checkout must roll the whole attempt back
        sqlx::query("DROP TABLE order_goods").execute(&pool).await.unwrap();

        let checkout = service(&pool);
        checkout.cart.add_item(7, 1, 2, true).unwrap();
        checkout.cart.add_item(7, 2, 1, true).unwrap();

        let err = checkout.place_order(7, 1, PayMethod::Cash).await.unwrap_err();
        assert!(matches!(err, CheckoutError::PlacementFailed(_)));

        assert_eq!(order_count(&pool).await, 0);
        assert_eq!(stock_and_sales(&pool, 1).await, (10, 0));
        assert_eq!(stock_and_sales(&pool, 2).await, (5, 0));
        assert_eq!(checkout.cart.list(7).unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_contention_one_unit_one_winner() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        seed_sku(&pool, 1, 5000, 1).await;

        let cart = CartStore::open(open_in_memory().unwrap()).unwrap();
        cart.add_item(1, 1, 1, true).unwrap();
        cart.add_item(2, 1, 1, true).unwrap();

        let checkout = CheckoutService::new(pool.clone(), cart);

        let a = {
            let c = checkout.clone();
            tokio::spawn(async move { c.place_order(1, 1, PayMethod::Cash).await })
        };
        let b = {
            let c = checkout.clone();
            tokio::spawn(async move { c.place_order(2, 1, PayMethod::Cash).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1, "exactly one checkout takes the last unit");

        for result in &results {
            if let Err(e) = result {
                assert!(matches!(
                    e,
                    CheckoutError::InsufficientStock(_) | CheckoutError::PlacementFailed(_)
                ));
            }
        }

        assert_eq!(stock_and_sales(&pool, 1).await, (0, 1));
        assert_eq!(order_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_totals_conserved_over_random_orders() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;

        for sku_id in 1..=8 {
            seed_sku(&pool, sku_id, sku_id * 199, 1_000_000).await;
        }

        let checkout = service(&pool);
        let mut placed = 0u32;

        use rand::Rng;
        for user_id in 1..=60 {
            let mut rng = rand::thread_rng();
            for sku_id in 1..=8 {
                if rng.gen_bool(0.4) {
                    checkout
                        .cart
                        .add_item(user_id, sku_id, rng.gen_range(1..=5), true)
                        .unwrap();
                }
            }
            let snapshot = checkout.cart.snapshot(user_id).unwrap();
            if snapshot.is_empty() {
                continue;
            }

            let view = checkout
                .place_order(user_id, 1, PayMethod::Alipay)
                .await
                .unwrap();
            placed += 1;

            // Exact conservation in decimal money, line by line
            let line_sum: Decimal = view
                .lines
                .iter()
                .map(|l| l.price * Decimal::from(l.count))
                .sum();
            assert_eq!(view.total_amount, line_sum + view.freight);
            let count_sum: i64 = view.lines.iter().map(|l| l.count).sum();
            assert_eq!(view.total_count, count_sum);
        }

        assert!(placed > 0);
        assert_eq!(order_count(&pool).await, i64::from(placed));

        // Recheck the invariant from what actually landed in storage
        let headers = sqlx::query_as::<_, (String, i64, i64)>(
            "SELECT order_id, total_count, total_amount_cents FROM order_info",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        for (order_id, total_count, total_amount_cents) in headers {
            let (line_count, line_cents) = sqlx::query_as::<_, (i64, i64)>(
                "SELECT COALESCE(SUM(count), 0), COALESCE(SUM(price_cents * count), 0) FROM order_goods WHERE order_id = ?",
            )
            .bind(&order_id)
            .fetch_one(&pool)
            .await
            .unwrap();
            assert_eq!(total_count, line_count);
            assert_eq!(total_amount_cents, line_cents + FREIGHT_CENTS);
        }
    }
}
