//! Payment Repository
//!
//! One row per settled order. UNIQUE indexes on order_id and trade_id
//! make replayed callbacks collide instead of double-recording.

use super::{RepoResult, duplicate_or_db};
use shared::models::Payment;
use sqlx::SqlitePool;

pub async fn insert<'e, E>(executor: E, order_id: &str, trade_id: &str) -> RepoResult<Payment>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query("INSERT INTO payment (id, order_id, trade_id, created_at) VALUES (?1, ?2, ?3, ?4)")
        .bind(id)
        .bind(order_id)
        .bind(trade_id)
        .bind(now)
        .execute(executor)
        .await
        .map_err(|e| duplicate_or_db(e, format!("payment for order {order_id} already recorded").as_str()))?;
    Ok(Payment {
        id,
        order_id: order_id.to_string(),
        trade_id: trade_id.to_string(),
        created_at: now,
    })
}

pub async fn find_by_order(pool: &SqlitePool, order_id: &str) -> RepoResult<Option<Payment>> {
    let row = sqlx::query_as::<_, Payment>(
        "SELECT id, order_id, trade_id, created_at FROM payment WHERE order_id = ?",
    )
    .bind(order_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
