//! Address Repository
//!
//! Rows are soft-deleted so orders keep a live foreign key to the
//! address they shipped to.

use super::{RepoError, RepoResult};
use shared::models::{Address, AddressCreate};
use sqlx::SqlitePool;

const ADDRESS_SELECT: &str = "SELECT id, user_id, title, receiver, province, city, district, place, mobile, tel, email, is_deleted, created_at, updated_at FROM address";

pub async fn create(pool: &SqlitePool, user_id: i64, data: &AddressCreate) -> RepoResult<Address> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO address (id, user_id, title, receiver, province, city, district, place, mobile, tel, email, is_deleted, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 0, ?12, ?12)",
    )
    .bind(id)
    .bind(user_id)
    .bind(&data.title)
    .bind(&data.receiver)
    .bind(&data.province)
    .bind(&data.city)
    .bind(&data.district)
    .bind(&data.place)
    .bind(&data.mobile)
    .bind(&data.tel)
    .bind(&data.email)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id_for_user(pool, id, user_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create address".into()))
}

/// Live (not soft-deleted) addresses of one user, newest first
pub async fn find_live_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Address>> {
    let sql = format!(
        "{ADDRESS_SELECT} WHERE user_id = ? AND is_deleted = 0 ORDER BY created_at DESC"
    );
    let rows = sqlx::query_as::<_, Address>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn count_live(pool: &SqlitePool, user_id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM address WHERE user_id = ? AND is_deleted = 0",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn find_by_id_for_user(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
) -> RepoResult<Option<Address>> {
    let sql = format!("{ADDRESS_SELECT} WHERE id = ? AND user_id = ? AND is_deleted = 0");
    let row = sqlx::query_as::<_, Address>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
    data: &AddressCreate,
) -> RepoResult<Address> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE address SET receiver = ?1, province = ?2, city = ?3, district = ?4, place = ?5, mobile = ?6, tel = ?7, email = ?8, updated_at = ?9 WHERE id = ?10 AND user_id = ?11 AND is_deleted = 0",
    )
    .bind(&data.receiver)
    .bind(&data.province)
    .bind(&data.city)
    .bind(&data.district)
    .bind(&data.place)
    .bind(&data.mobile)
    .bind(&data.tel)
    .bind(&data.email)
    .bind(now)
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Address {id} not found")));
    }
    find_by_id_for_user(pool, id, user_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Address {id} not found")))
}

pub async fn update_title(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
    title: &str,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE address SET title = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4 AND is_deleted = 0",
    )
    .bind(title)
    .bind(now)
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Address {id} not found")));
    }
    Ok(())
}

pub async fn soft_delete(pool: &SqlitePool, id: i64, user_id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE address SET is_deleted = 1, updated_at = ?1 WHERE id = ?2 AND user_id = ?3 AND is_deleted = 0",
    )
    .bind(now)
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}
