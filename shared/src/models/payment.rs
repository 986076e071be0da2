//! Payment record model

use serde::{Deserialize, Serialize};

/// Payment record — one-to-one with a settled order, append-only.
///
/// `order_id` and `trade_id` are both UNIQUE at the storage layer; a
/// replayed callback can never produce a second row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub order_id: String,
    /// External gateway trade identifier
    pub trade_id: String,
    pub created_at: i64,
}

/// Settlement callback payload (after gateway redirect)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRequest {
    pub order_id: String,
    pub trade_id: String,
    /// Gateway signature over the other fields
    pub sign: String,
}

/// Settlement response: the recorded trade id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeView {
    pub trade_id: String,
}

/// Gateway redirect URL for an unpaid order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentUrlView {
    pub pay_url: String,
}
