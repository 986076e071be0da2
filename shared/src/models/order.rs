//! Order model and status state machine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::util::to_decimal;

/// Fixed freight surcharge added to every order (10.00)
pub const FREIGHT_CENTS: i64 = 1000;

/// Payment method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum PayMethod {
    /// Cash on delivery — order starts out awaiting shipment
    Cash,
    /// Online gateway — order starts out awaiting payment
    Alipay,
}

impl PayMethod {
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Alipay)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Alipay => "ALIPAY",
        }
    }
}

/// Order status state machine
///
/// ```text
/// CASH   ──▶ UNSEND ──▶ UNRECEIVED ──▶ UNCOMMENT ──▶ FINISHED
/// online ──▶ UNPAID ──▶ UNSEND (settlement only)
///                 └──▶ CANCELLED
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum OrderStatus {
    Unpaid,
    Unsend,
    Unreceived,
    Uncomment,
    Finished,
    Cancelled,
}

impl OrderStatus {
    /// Status a freshly created order starts in, per pay method
    pub fn initial_for(pay_method: PayMethod) -> Self {
        match pay_method {
            PayMethod::Cash => Self::Unsend,
            PayMethod::Alipay => Self::Unpaid,
        }
    }

    /// Whether `self → to` is a legal transition.
    ///
    /// UNPAID→UNSEND is reserved for the settlement reconciler; its
    /// at-most-once property is enforced by the status-equality predicate
    /// of the settlement update, not just by this table.
    pub fn can_transition(&self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, to),
            (Unpaid, Unsend)
                | (Unpaid, Cancelled)
                | (Unsend, Unreceived)
                | (Unreceived, Uncomment)
                | (Uncomment, Finished)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "UNPAID",
            Self::Unsend => "UNSEND",
            Self::Unreceived => "UNRECEIVED",
            Self::Uncomment => "UNCOMMENT",
            Self::Finished => "FINISHED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// Synthetic order id: second-resolution timestamp + zero-padded user id.
///
/// `20260822093045` + `0000000042` → `202608220930450000000042`
pub fn order_id_for(user_id: i64, at: DateTime<Utc>) -> String {
    format!("{}{:010}", at.format("%Y%m%d%H%M%S"), user_id)
}

/// Order header entity
///
/// Invariants (enforced by the checkout transaction):
/// - `total_amount_cents == Σ(line.price_cents * line.count) + freight_cents`
/// - `total_count == Σ(line.count)`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderInfo {
    pub order_id: String,
    pub user_id: i64,
    /// Live reference; not a snapshot of the address fields
    pub address_id: i64,
    pub total_count: i64,
    pub total_amount_cents: i64,
    pub freight_cents: i64,
    pub pay_method: PayMethod,
    pub status: OrderStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line entity — sku price frozen at purchase time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: i64,
    pub order_id: String,
    pub sku_id: i64,
    pub count: i64,
    /// Unit price in cents, copied from the catalog when the line was placed
    pub price_cents: i64,
    pub created_at: i64,
}

/// API view of one line with decimal money
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineView {
    pub sku_id: i64,
    pub count: i64,
    pub price: Decimal,
}

impl From<OrderLine> for OrderLineView {
    fn from(l: OrderLine) -> Self {
        Self {
            sku_id: l.sku_id,
            count: l.count,
            price: to_decimal(l.price_cents),
        }
    }
}

/// API view of an order with its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    pub order_id: String,
    pub address_id: i64,
    pub total_count: i64,
    pub total_amount: Decimal,
    pub freight: Decimal,
    pub pay_method: PayMethod,
    pub status: OrderStatus,
    pub created_at: i64,
    pub lines: Vec<OrderLineView>,
}

impl OrderView {
    pub fn from_parts(order: OrderInfo, lines: Vec<OrderLine>) -> Self {
        Self {
            order_id: order.order_id,
            address_id: order.address_id,
            total_count: order.total_count,
            total_amount: to_decimal(order.total_amount_cents),
            freight: to_decimal(order.freight_cents),
            pay_method: order.pay_method,
            status: order.status,
            created_at: order.created_at,
            lines: lines.into_iter().map(OrderLineView::from).collect(),
        }
    }
}

/// Checkout request: the cart itself is read server-side
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    pub address_id: i64,
    pub pay_method: PayMethod,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_order_id_format() {
        let at = Utc.with_ymd_and_hms(2026, 8, 22, 9, 30, 45).unwrap();
        assert_eq!(order_id_for(42, at), "202608220930450000000042");
        assert_eq!(order_id_for(42, at).len(), 24);
    }

    #[test]
    fn test_initial_status() {
        assert_eq!(OrderStatus::initial_for(PayMethod::Cash), OrderStatus::Unsend);
        assert_eq!(OrderStatus::initial_for(PayMethod::Alipay), OrderStatus::Unpaid);
    }

    #[test]
    fn test_transition_table() {
        use OrderStatus::*;
        assert!(Unpaid.can_transition(Unsend));
        assert!(Unpaid.can_transition(Cancelled));
        assert!(Unsend.can_transition(Unreceived));
        assert!(Unreceived.can_transition(Uncomment));
        assert!(Uncomment.can_transition(Finished));

        // settlement must not re-fire
        assert!(!Unsend.can_transition(Unsend));
        assert!(!Unsend.can_transition(Unpaid));
        assert!(!Finished.can_transition(Unreceived));
        assert!(!Cancelled.can_transition(Unsend));
    }

    #[test]
    fn test_status_tokens() {
        assert_eq!(OrderStatus::Unpaid.as_str(), "UNPAID");
        assert_eq!(
            serde_json::to_string(&OrderStatus::Unreceived).unwrap(),
            "\"UNRECEIVED\""
        );
        assert_eq!(PayMethod::Cash.as_str(), "CASH");
        assert!(!PayMethod::Cash.is_online());
        assert!(PayMethod::Alipay.is_online());
    }

    #[test]
    fn test_order_view_money() {
        let order = OrderInfo {
            order_id: "202608220930450000000042".into(),
            user_id: 42,
            address_id: 7,
            total_count: 3,
            total_amount_cents: 17000,
            freight_cents: FREIGHT_CENTS,
            pay_method: PayMethod::Cash,
            status: OrderStatus::Unsend,
            created_at: 0,
            updated_at: 0,
        };
        let lines = vec![
            OrderLine {
                id: 1,
                order_id: order.order_id.clone(),
                sku_id: 1,
                count: 2,
                price_cents: 5000,
                created_at: 0,
            },
            OrderLine {
                id: 2,
                order_id: order.order_id.clone(),
                sku_id: 2,
                count: 1,
                price_cents: 3000,
                created_at: 0,
            },
        ];
        let view = OrderView::from_parts(order, lines);
        assert_eq!(view.total_amount.to_string(), "170.00");
        assert_eq!(view.freight.to_string(), "10.00");
        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.lines[0].price.to_string(), "50.00");
    }
}
