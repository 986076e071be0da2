//! SKU Repository
//!
//! Catalog reads plus the conditional stock decrement used by checkout.
//! stock/sales 只通过 compare-and-swap 更新,永不越过 0。

use super::{RepoError, RepoResult};
use shared::models::{Sku, SkuOrdering};
use sqlx::SqlitePool;

const SKU_SELECT: &str = "SELECT id, name, caption, category_id, price_cents, stock, sales, is_launched, created_at, updated_at FROM sku";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Sku>> {
    let sql = format!("{SKU_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Sku>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Launched SKUs of one category, ordered per the caller's choice
pub async fn find_by_category(
    pool: &SqlitePool,
    category_id: i64,
    ordering: SkuOrdering,
) -> RepoResult<Vec<Sku>> {
    let order_clause = match ordering {
        SkuOrdering::CreateTime => "created_at DESC",
        SkuOrdering::Price => "price_cents ASC",
        SkuOrdering::Sales => "sales DESC",
    };
    let sql = format!(
        "{SKU_SELECT} WHERE category_id = ? AND is_launched = 1 ORDER BY {order_clause}"
    );
    let rows = sqlx::query_as::<_, Sku>(&sql)
        .bind(category_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn search(pool: &SqlitePool, query: &str) -> RepoResult<Vec<Sku>> {
    let pattern = format!("%{query}%");
    let sql = format!(
        "{SKU_SELECT} WHERE is_launched = 1 AND (name LIKE ?1 OR caption LIKE ?1) ORDER BY sales DESC"
    );
    let rows = sqlx::query_as::<_, Sku>(&sql)
        .bind(&pattern)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Fetch several SKUs by id; missing ids are silently absent from the result
pub async fn find_many(pool: &SqlitePool, ids: &[i64]) -> RepoResult<Vec<Sku>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("{SKU_SELECT} WHERE id IN ({placeholders})");
    let mut query = sqlx::query_as::<_, Sku>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

/// Compare-and-swap stock decrement.
///
/// Succeeds only if the row still holds `expected_stock`: stock becomes
/// `expected_stock - count` and sales grows by `count` in the same statement.
/// Returns `false` when another writer got there first (stale expectation).
pub async fn conditional_decrement<'e, E>(
    executor: E,
    sku_id: i64,
    expected_stock: i64,
    count: i64,
) -> RepoResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    if count <= 0 {
        return Err(RepoError::Validation(format!(
            "decrement count must be positive, got {count}"
        )));
    }
    if count > expected_stock {
        return Err(RepoError::Validation(format!(
            "decrement {count} exceeds expected stock {expected_stock} for sku {sku_id}"
        )));
    }
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE sku SET stock = ?1, sales = sales + ?2, updated_at = ?3 WHERE id = ?4 AND stock = ?5",
    )
    .bind(expected_stock - count)
    .bind(count)
    .bind(now)
    .bind(sku_id)
    .bind(expected_stock)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() == 1)
}
