//! Cart types
//!
//! The cart lives in the auxiliary key-value store as two structures per
//! user: a quantity mapping (sku → count) and a set of "selected" sku ids.
//! [`CartSnapshot`] is the point-in-time view checkout consumes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::sku::SkuView;

/// Point-in-time cart contents for one user.
///
/// Selected ids come back in ascending sku order from the store's range
/// scan; nothing downstream relies on that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    pub selected: BTreeSet<i64>,
    pub quantities: BTreeMap<i64, i64>,
}

impl CartSnapshot {
    /// A checkout needs at least one selected item
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Quantity for a selected sku, if present in the mapping
    pub fn quantity_of(&self, sku_id: i64) -> Option<i64> {
        self.quantities.get(&sku_id).copied()
    }
}

/// Raw cart row (as stored)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    pub sku_id: i64,
    pub count: i64,
    pub selected: bool,
}

/// Cart row joined with live SKU data for the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemView {
    #[serde(flatten)]
    pub sku: SkuView,
    pub count: i64,
    pub selected: bool,
}

fn default_selected() -> bool {
    true
}

/// Add/replace a cart line
#[derive(Debug, Clone, Deserialize)]
pub struct CartItemUpsert {
    pub sku_id: i64,
    pub count: i64,
    #[serde(default = "default_selected")]
    pub selected: bool,
}

/// Select/deselect the whole cart
#[derive(Debug, Clone, Deserialize)]
pub struct CartSelection {
    pub selected: bool,
}
