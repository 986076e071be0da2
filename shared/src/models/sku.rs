//! SKU (product variant) model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::util::to_decimal;

/// SKU entity — owns the per-variant price/stock/sales counters.
///
/// `stock` never goes below zero: it is mutated only through the
/// conditional-decrement update in the sku repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Sku {
    pub id: i64,
    pub name: String,
    pub caption: String,
    pub category_id: i64,
    /// Unit price in integer cents
    pub price_cents: i64,
    pub stock: i64,
    pub sales: i64,
    pub is_launched: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// API view with decimal price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuView {
    pub id: i64,
    pub name: String,
    pub caption: String,
    pub category_id: i64,
    pub price: Decimal,
    pub stock: i64,
    pub sales: i64,
}

impl From<Sku> for SkuView {
    fn from(s: Sku) -> Self {
        Self {
            id: s.id,
            name: s.name,
            caption: s.caption,
            category_id: s.category_id,
            price: to_decimal(s.price_cents),
            stock: s.stock,
            sales: s.sales,
        }
    }
}

/// Category listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkuOrdering {
    /// Newest first (default)
    #[default]
    CreateTime,
    /// Cheapest first
    Price,
    /// Best-selling first
    Sales,
}

impl SkuOrdering {
    /// Parse the `ordering` query parameter; unknown values fall back to
    /// newest-first.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("price") => Self::Price,
            Some("sales") | Some("-sales") | Some("hot") => Self::Sales,
            _ => Self::CreateTime,
        }
    }
}
