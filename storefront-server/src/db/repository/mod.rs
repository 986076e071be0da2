//! Repository Module
//!
//! CRUD operations over the SQLite tables. Functions take either the pool
//! or an open transaction, so callers decide the commit boundary.

// Accounts
pub mod address;
pub mod user;

// Catalog
pub mod sku;

// Orders
pub mod order;
pub mod payment;

use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Map a sqlx error to `Duplicate` when it is a UNIQUE violation
pub(crate) fn duplicate_or_db(err: sqlx::Error, what: &str) -> RepoError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return RepoError::Duplicate(what.to_string());
        }
    }
    RepoError::Database(err.to_string())
}
