//! Cart store
//!
//! Two tables keyed by (user_id, sku_id): quantities and a selected-flag
//! set. Checkout reads a point-in-time snapshot and, after commit, removes
//! just the lines it processed — removals of absent keys are no-ops, so
//! cleanup can race user edits safely.

use super::KvResult;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::models::{CartItem, CartSnapshot};
use std::sync::Arc;

/// Quantities: (user_id, sku_id) -> count
const CART_ITEMS_TABLE: TableDefinition<(i64, i64), i64> = TableDefinition::new("cart_items");

/// Selected flags: (user_id, sku_id) -> ()
const CART_SELECTED_TABLE: TableDefinition<(i64, i64), ()> = TableDefinition::new("cart_selected");

#[derive(Clone)]
pub struct CartStore {
    db: Arc<Database>,
}

impl CartStore {
    /// Open over a shared database, creating the tables on first use
    pub fn open(db: Arc<Database>) -> KvResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CART_ITEMS_TABLE)?;
            let _ = write_txn.open_table(CART_SELECTED_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Add a line; an existing line accumulates the count
    pub fn add_item(&self, user_id: i64, sku_id: i64, count: i64, selected: bool) -> KvResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut items = write_txn.open_table(CART_ITEMS_TABLE)?;
            let existing = items.get((user_id, sku_id))?.map(|g| g.value()).unwrap_or(0);
            items.insert((user_id, sku_id), existing + count)?;

            let mut flags = write_txn.open_table(CART_SELECTED_TABLE)?;
            if selected {
                flags.insert((user_id, sku_id), ())?;
            } else {
                flags.remove((user_id, sku_id))?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Replace a line's count and selected flag
    pub fn set_item(&self, user_id: i64, sku_id: i64, count: i64, selected: bool) -> KvResult<bool> {
        let write_txn = self.db.begin_write()?;
        let found = {
            let mut items = write_txn.open_table(CART_ITEMS_TABLE)?;
            let found = items.get((user_id, sku_id))?.is_some();
            if found {
                items.insert((user_id, sku_id), count)?;
                let mut flags = write_txn.open_table(CART_SELECTED_TABLE)?;
                if selected {
                    flags.insert((user_id, sku_id), ())?;
                } else {
                    flags.remove((user_id, sku_id))?;
                }
            }
            found
        };
        write_txn.commit()?;
        Ok(found)
    }

    pub fn remove_item(&self, user_id: i64, sku_id: i64) -> KvResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut items = write_txn.open_table(CART_ITEMS_TABLE)?;
            items.remove((user_id, sku_id))?;
            let mut flags = write_txn.open_table(CART_SELECTED_TABLE)?;
            flags.remove((user_id, sku_id))?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Flip the selected flag on every line of one user's cart
    pub fn select_all(&self, user_id: i64, selected: bool) -> KvResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let items = write_txn.open_table(CART_ITEMS_TABLE)?;
            let keys: Vec<(i64, i64)> = {
                let range_start: (i64, i64) = (user_id, i64::MIN);
                let range_end: (i64, i64) = (user_id, i64::MAX);
                let mut keys = Vec::new();
                for result in items.range(range_start..=range_end)? {
                    let (key, _) = result?;
                    keys.push(key.value());
                }
                keys
            };
            drop(items);

            let mut flags = write_txn.open_table(CART_SELECTED_TABLE)?;
            for key in keys {
                if selected {
                    flags.insert(key, ())?;
                } else {
                    flags.remove(key)?;
                }
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// All lines of one user's cart
    pub fn list(&self, user_id: i64) -> KvResult<Vec<CartItem>> {
        let read_txn = self.db.begin_read()?;
        let items = read_txn.open_table(CART_ITEMS_TABLE)?;
        let flags = read_txn.open_table(CART_SELECTED_TABLE)?;

        let range_start: (i64, i64) = (user_id, i64::MIN);
        let range_end: (i64, i64) = (user_id, i64::MAX);

        let mut out = Vec::new();
        for result in items.range(range_start..=range_end)? {
            let (key, count) = result?;
            let (_, sku_id) = key.value();
            let selected = flags.get((user_id, sku_id))?.is_some();
            out.push(CartItem {
                sku_id,
                count: count.value(),
                selected,
            });
        }
        Ok(out)
    }

    /// Point-in-time view of the selected lines.
    ///
    /// Both tables are read in one transaction; a selected flag without a
    /// quantity row is skipped rather than surfaced.
    pub fn snapshot(&self, user_id: i64) -> KvResult<CartSnapshot> {
        let read_txn = self.db.begin_read()?;
        let items = read_txn.open_table(CART_ITEMS_TABLE)?;
        let flags = read_txn.open_table(CART_SELECTED_TABLE)?;

        let range_start: (i64, i64) = (user_id, i64::MIN);
        let range_end: (i64, i64) = (user_id, i64::MAX);

        let mut snapshot = CartSnapshot::default();
        for result in items.range(range_start..=range_end)? {
            let (key, count) = result?;
            let (_, sku_id) = key.value();
            snapshot.quantities.insert(sku_id, count.value());
        }
        for result in flags.range(range_start..=range_end)? {
            let (key, _) = result?;
            let (_, sku_id) = key.value();
            if snapshot.quantities.contains_key(&sku_id) {
                snapshot.selected.insert(sku_id);
            }
        }
        Ok(snapshot)
    }

    /// Drop the given lines from both tables. Absent keys are no-ops, so
    /// calling this twice (or after the user edited the cart) is safe.
    pub fn remove_checked_out(&self, user_id: i64, sku_ids: &[i64]) -> KvResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut items = write_txn.open_table(CART_ITEMS_TABLE)?;
            let mut flags = write_txn.open_table(CART_SELECTED_TABLE)?;
            for &sku_id in sku_ids {
                items.remove((user_id, sku_id))?;
                flags.remove((user_id, sku_id))?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::open_in_memory;

    fn store() -> CartStore {
        CartStore::open(open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn test_add_accumulates_set_replaces() {
        let cart = store();
        cart.add_item(1, 10, 2, true).unwrap();
        cart.add_item(1, 10, 3, true).unwrap();

        let items = cart.list(1).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].count, 5);

        assert!(cart.set_item(1, 10, 2, false).unwrap());
        let items = cart.list(1).unwrap();
        assert_eq!(items[0].count, 2);
        assert!(!items[0].selected);

        // set on a missing line reports false and stores nothing
        assert!(!cart.set_item(1, 99, 1, true).unwrap());
        assert_eq!(cart.list(1).unwrap().len(), 1);
    }

    #[test]
    fn test_snapshot_only_selected() {
        let cart = store();
        cart.add_item(1, 10, 2, true).unwrap();
        cart.add_item(1, 11, 1, false).unwrap();
        cart.add_item(1, 12, 4, true).unwrap();

        let snap = cart.snapshot(1).unwrap();
        assert_eq!(snap.selected.len(), 2);
        assert!(snap.selected.contains(&10));
        assert!(snap.selected.contains(&12));
        assert_eq!(snap.quantities.len(), 3);
        assert_eq!(snap.quantity_of(12), Some(4));
        assert!(!snap.is_empty());
    }

    #[test]
    fn test_snapshot_isolated_per_user() {
        let cart = store();
        cart.add_item(1, 10, 2, true).unwrap();
        cart.add_item(2, 10, 7, true).unwrap();

        let snap = cart.snapshot(1).unwrap();
        assert_eq!(snap.quantity_of(10), Some(2));
        let snap = cart.snapshot(2).unwrap();
        assert_eq!(snap.quantity_of(10), Some(7));
    }

    #[test]
    fn test_select_all() {
        let cart = store();
        cart.add_item(1, 10, 1, false).unwrap();
        cart.add_item(1, 11, 1, false).unwrap();

        cart.select_all(1, true).unwrap();
        assert!(cart.list(1).unwrap().iter().all(|i| i.selected));

        cart.select_all(1, false).unwrap();
        assert!(cart.list(1).unwrap().iter().all(|i| !i.selected));
        assert!(cart.snapshot(1).unwrap().is_empty());
    }

    #[test]
    fn test_remove_checked_out_idempotent() {
        let cart = store();
        cart.add_item(1, 10, 2, true).unwrap();
        cart.add_item(1, 11, 1, false).unwrap();

        cart.remove_checked_out(1, &[10]).unwrap();
        let snap = cart.snapshot(1).unwrap();
        assert!(snap.selected.is_empty());
        assert_eq!(snap.quantity_of(11), Some(1));

        // Second pass over the same ids changes nothing
        cart.remove_checked_out(1, &[10]).unwrap();
        assert_eq!(cart.list(1).unwrap().len(), 1);

        cart.remove_item(1, 11).unwrap();
        cart.remove_item(1, 11).unwrap();
        assert!(cart.list(1).unwrap().is_empty());
    }
}
