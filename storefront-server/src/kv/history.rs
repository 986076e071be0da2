//! Browse history store
//!
//! One JSON list per user, most recent first. Revisits move the SKU to
//! the front; the list is capped at [`HISTORY_LIMIT`].

use super::KvResult;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::sync::Arc;

/// History lists: user_id -> JSON array of sku ids
const HISTORY_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("browse_history");

pub const HISTORY_LIMIT: usize = 5;

#[derive(Clone)]
pub struct HistoryStore {
    db: Arc<Database>,
}

impl HistoryStore {
    pub fn open(db: Arc<Database>) -> KvResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(HISTORY_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Record a visit: dedupe, push to the front, trim
    pub fn push(&self, user_id: i64, sku_id: i64) -> KvResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(HISTORY_TABLE)?;

            let mut history: Vec<i64> = match table.get(user_id)? {
                Some(guard) => serde_json::from_slice(guard.value())?,
                None => Vec::new(),
            };

            history.retain(|&id| id != sku_id);
            history.insert(0, sku_id);
            history.truncate(HISTORY_LIMIT);

            let bytes = serde_json::to_vec(&history)?;
            table.insert(user_id, bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Most recent first
    pub fn list(&self, user_id: i64) -> KvResult<Vec<i64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(HISTORY_TABLE)?;
        match table.get(user_id)? {
            Some(guard) => Ok(serde_json::from_slice(guard.value())?),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::open_in_memory;

    #[test]
    fn test_push_dedupes_and_trims() {
        let history = HistoryStore::open(open_in_memory().unwrap()).unwrap();

        for sku_id in [1, 2, 3, 2] {
            history.push(7, sku_id).unwrap();
        }
        // Revisiting 2 moved it to the front
        assert_eq!(history.list(7).unwrap(), vec![2, 3, 1]);

        for sku_id in [4, 5, 6] {
            history.push(7, sku_id).unwrap();
        }
        let listed = history.list(7).unwrap();
        assert_eq!(listed.len(), HISTORY_LIMIT);
        assert_eq!(listed, vec![6, 5, 4, 2, 3]);
    }

    #[test]
    fn test_empty_history() {
        let history = HistoryStore::open(open_in_memory().unwrap()).unwrap();
        assert!(history.list(42).unwrap().is_empty());
    }
}
