//! Auxiliary key-value store (redb)
//!
//! Carts, browse history and verification codes live here instead of
//! SQLite: they are per-user scratch state with no relational joins.
//! All stores share one database file.

pub mod cart;
pub mod codes;
pub mod history;

pub use cart::CartStore;
pub use codes::{CodeCheck, IssueOutcome, VerifyCodeStore};
pub use history::HistoryStore;

use redb::Database;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type KvResult<T> = Result<T, KvError>;

impl From<KvError> for shared::AppError {
    fn from(err: KvError) -> Self {
        shared::AppError::storage(err.to_string())
    }
}

/// Open or create the store file
pub fn open_database(path: impl AsRef<Path>) -> KvResult<Arc<Database>> {
    Ok(Arc::new(Database::create(path)?))
}

/// In-memory database (for testing)
pub fn open_in_memory() -> KvResult<Arc<Database>> {
    let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
    Ok(Arc::new(db))
}
