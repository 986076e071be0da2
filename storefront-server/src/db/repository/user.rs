//! User Repository

use super::{RepoError, RepoResult, duplicate_or_db};
use shared::models::User;
use sqlx::SqlitePool;

const USER_SELECT: &str = "SELECT id, username, password_hash, mobile, email, email_verified, default_address_id, created_at, updated_at FROM user";

pub async fn create(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    mobile: &str,
) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO user (id, username, password_hash, mobile, email_verified, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)",
    )
    .bind(id)
    .bind(username)
    .bind(password_hash)
    .bind(mobile)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| duplicate_or_db(e, "username or mobile already registered"))?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE username = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// How many accounts hold this username (0 or 1 under the UNIQUE index)
pub async fn count_by_username(pool: &SqlitePool, username: &str) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user WHERE username = ?")
        .bind(username)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_by_mobile(pool: &SqlitePool, mobile: &str) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user WHERE mobile = ?")
        .bind(mobile)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Set a new email address; verification resets until the link is clicked
pub async fn set_email(pool: &SqlitePool, user_id: i64, email: &str) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE user SET email = ?1, email_verified = 0, updated_at = ?2 WHERE id = ?3",
    )
    .bind(email)
    .bind(now)
    .bind(user_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {user_id} not found")));
    }
    Ok(())
}

pub async fn mark_email_verified(pool: &SqlitePool, user_id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE user SET email_verified = 1, updated_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(user_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {user_id} not found")));
    }
    Ok(())
}

pub async fn set_default_address(
    pool: &SqlitePool,
    user_id: i64,
    address_id: i64,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE user SET default_address_id = ?1, updated_at = ?2 WHERE id = ?3",
    )
    .bind(address_id)
    .bind(now)
    .bind(user_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {user_id} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(
            "CREATE TABLE user (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                mobile TEXT NOT NULL UNIQUE,
                email TEXT,
                email_verified INTEGER NOT NULL DEFAULT 0,
                default_address_id INTEGER,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();
        pool
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = test_pool().await;
        let user = create(&pool, "alice2026", "$argon2$fake", "13612345678")
            .await
            .unwrap();
        assert_eq!(user.username, "alice2026");
        assert!(!user.email_verified);

        let found = find_by_username(&pool, "alice2026").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(count_by_username(&pool, "alice2026").await.unwrap(), 1);
        assert_eq!(count_by_mobile(&pool, "13612345678").await.unwrap(), 1);
        assert_eq!(count_by_username(&pool, "nobody").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let pool = test_pool().await;
        create(&pool, "alice2026", "$argon2$fake", "13612345678")
            .await
            .unwrap();

        let err = create(&pool, "alice2026", "$argon2$fake", "13698765432")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        let err = create(&pool, "bob2026", "$argon2$fake", "13612345678")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_email_lifecycle() {
        let pool = test_pool().await;
        let user = create(&pool, "alice2026", "$argon2$fake", "13612345678")
            .await
            .unwrap();

        set_email(&pool, user.id, "alice@example.com").await.unwrap();
        let u = find_by_id(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(u.email.as_deref(), Some("alice@example.com"));
        assert!(!u.email_verified);

        mark_email_verified(&pool, user.id).await.unwrap();
        let u = find_by_id(&pool, user.id).await.unwrap().unwrap();
        assert!(u.email_verified);

        // Changing the address resets verification
        set_email(&pool, user.id, "new@example.com").await.unwrap();
        let u = find_by_id(&pool, user.id).await.unwrap().unwrap();
        assert!(!u.email_verified);
    }

    #[tokio::test]
    async fn test_set_default_address_missing_user() {
        let pool = test_pool().await;
        let err = set_default_address(&pool, 42, 1).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
