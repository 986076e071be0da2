//! Order Repository
//!
//! Header and line writes take any executor so checkout can run them on
//! one transaction; reads go through the pool.

use super::{RepoError, RepoResult, duplicate_or_db};
use shared::models::{OrderInfo, OrderLine, OrderStatus, PayMethod};
use sqlx::SqlitePool;

const ORDER_SELECT: &str = "SELECT order_id, user_id, address_id, total_count, total_amount_cents, freight_cents, pay_method, status, created_at, updated_at FROM order_info";

const LINE_SELECT: &str =
    "SELECT id, order_id, sku_id, count, price_cents, created_at FROM order_goods";

pub async fn insert_header<'e, E>(executor: E, order: &OrderInfo) -> RepoResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "INSERT INTO order_info (order_id, user_id, address_id, total_count, total_amount_cents, freight_cents, pay_method, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )
    .bind(&order.order_id)
    .bind(order.user_id)
    .bind(order.address_id)
    .bind(order.total_count)
    .bind(order.total_amount_cents)
    .bind(order.freight_cents)
    .bind(order.pay_method)
    .bind(order.status)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(executor)
    .await
    .map_err(|e| duplicate_or_db(e, format!("order {} already exists", order.order_id).as_str()))?;
    Ok(())
}

pub async fn insert_line<'e, E>(executor: E, line: &OrderLine) -> RepoResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "INSERT INTO order_goods (id, order_id, sku_id, count, price_cents, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(line.id)
    .bind(&line.order_id)
    .bind(line.sku_id)
    .bind(line.count)
    .bind(line.price_cents)
    .bind(line.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Write the accumulated totals back onto the header
pub async fn update_totals<'e, E>(
    executor: E,
    order_id: &str,
    total_count: i64,
    total_amount_cents: i64,
) -> RepoResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE order_info SET total_count = ?1, total_amount_cents = ?2, updated_at = ?3 WHERE order_id = ?4",
    )
    .bind(total_count)
    .bind(total_amount_cents)
    .bind(now)
    .bind(order_id)
    .execute(executor)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {order_id} not found")));
    }
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, order_id: &str) -> RepoResult<Option<OrderInfo>> {
    let sql = format!("{ORDER_SELECT} WHERE order_id = ?");
    let row = sqlx::query_as::<_, OrderInfo>(&sql)
        .bind(order_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_id_for_user(
    pool: &SqlitePool,
    order_id: &str,
    user_id: i64,
) -> RepoResult<Option<OrderInfo>> {
    let sql = format!("{ORDER_SELECT} WHERE order_id = ? AND user_id = ?");
    let row = sqlx::query_as::<_, OrderInfo>(&sql)
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_lines(pool: &SqlitePool, order_id: &str) -> RepoResult<Vec<OrderLine>> {
    let sql = format!("{LINE_SELECT} WHERE order_id = ? ORDER BY id");
    let rows = sqlx::query_as::<_, OrderLine>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// All orders of one user, newest first
pub async fn list_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<OrderInfo>> {
    let sql = format!("{ORDER_SELECT} WHERE user_id = ? ORDER BY created_at DESC, order_id DESC");
    let rows = sqlx::query_as::<_, OrderInfo>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Settlement guard: advance UNPAID → UNSEND exactly once.
///
/// The predicate pins the order to its owner, an online pay method and the
/// UNPAID status, so a replayed callback matches zero rows.
pub async fn settle_mark_paid<'e, E>(executor: E, order_id: &str, user_id: i64) -> RepoResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE order_info SET status = ?1, updated_at = ?2 WHERE order_id = ?3 AND user_id = ?4 AND pay_method = ?5 AND status = ?6",
    )
    .bind(OrderStatus::Unsend)
    .bind(now)
    .bind(order_id)
    .bind(user_id)
    .bind(PayMethod::Alipay)
    .bind(OrderStatus::Unpaid)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::FREIGHT_CENTS;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(
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
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "CREATE TABLE order_goods (
                id INTEGER PRIMARY KEY,
                order_id TEXT NOT NULL,
                sku_id INTEGER NOT NULL,
                count INTEGER NOT NULL CHECK (count > 0),
                price_cents INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();
        pool
    }

    fn header(order_id: &str, user_id: i64, pay_method: PayMethod) -> OrderInfo {
        let now = shared::util::now_millis();
        OrderInfo {
            order_id: order_id.to_string(),
            user_id,
            address_id: 1,
            total_count: 0,
            total_amount_cents: 0,
            freight_cents: FREIGHT_CENTS,
            pay_method,
            status: OrderStatus::initial_for(pay_method),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_header_roundtrip_and_totals() {
        let pool = test_pool().await;
        let order = header("202608220001", 7, PayMethod::Alipay);
        insert_header(&pool, &order).await.unwrap();

        update_totals(&pool, "202608220001", 3, 18000).await.unwrap();
        let found = find_by_id(&pool, "202608220001").await.unwrap().unwrap();
        assert_eq!(found.total_count, 3);
        assert_eq!(found.total_amount_cents, 18000);
        assert_eq!(found.status, OrderStatus::Unpaid);

        assert!(find_by_id_for_user(&pool, "202608220001", 8)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_header_rejected() {
        let pool = test_pool().await;
        let order = header("202608220001", 7, PayMethod::Cash);
        insert_header(&pool, &order).await.unwrap();
        let err = insert_header(&pool, &order).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_lines_ordered() {
        let pool = test_pool().await;
        let order = header("202608220001", 7, PayMethod::Cash);
        insert_header(&pool, &order).await.unwrap();

        for (id, sku_id) in [(2, 20), (1, 10)] {
            insert_line(
                &pool,
                &OrderLine {
                    id,
                    order_id: "202608220001".to_string(),
                    sku_id,
                    count: 1,
                    price_cents: 1000,
                    created_at: 0,
                },
            )
            .await
            .unwrap();
        }

        let lines = find_lines(&pool, "202608220001").await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].id, 1);
    }

    #[tokio::test]
    async fn test_settle_guard_exactly_once() {
        let pool = test_pool().await;
        insert_header(&pool, &header("A1", 7, PayMethod::Alipay))
            .await
            .unwrap();

        assert!(settle_mark_paid(&pool, "A1", 7).await.unwrap());
        let found = find_by_id(&pool, "A1").await.unwrap().unwrap();
        assert_eq!(found.status, OrderStatus::Unsend);

        // Replay: status is no longer UNPAID
        assert!(!settle_mark_paid(&pool, "A1", 7).await.unwrap());
    }

    #[tokio::test]
    async fn test_settle_guard_rejects_cash_and_foreign_orders() {
        let pool = test_pool().await;
        insert_header(&pool, &header("C1", 7, PayMethod::Cash))
            .await
            .unwrap();
        insert_header(&pool, &header("A2", 9, PayMethod::Alipay))
            .await
            .unwrap();

        // Cash orders are born UNSEND and never settle online
        assert!(!settle_mark_paid(&pool, "C1", 7).await.unwrap());
        // Wrong owner
        assert!(!settle_mark_paid(&pool, "A2", 7).await.unwrap());
        // Right owner still works
        assert!(settle_mark_paid(&pool, "A2", 9).await.unwrap());
    }
}
