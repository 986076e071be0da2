//! Entity models and request/response DTOs
//!
//! Entities mirror the relational schema (`sqlx::FromRow` behind the `db`
//! feature); views carry `Decimal` money for the API surface; request DTOs
//! derive `validator::Validate`.

pub mod address;
pub mod cart;
pub mod order;
pub mod payment;
pub mod sku;
pub mod user;

pub use address::{Address, AddressCreate, AddressTitleUpdate, AddressView, USER_ADDRESS_LIMIT};
pub use cart::{CartItem, CartItemUpsert, CartItemView, CartSelection, CartSnapshot};
pub use order::{
    FREIGHT_CENTS, OrderInfo, OrderLine, OrderLineView, OrderStatus, OrderView, PayMethod,
    PlaceOrderRequest, order_id_for,
};
pub use payment::{Payment, PaymentUrlView, SettlementRequest, TradeView};
pub use sku::{Sku, SkuOrdering, SkuView};
pub use user::{
    AuthTokenResponse, EmailUpdate, LoginRequest, RegisterRequest, User, UserProfile,
};

use validator::ValidationError;

/// Mainland mobile number: 11 digits, `1[3-9]` prefix.
pub fn validate_mobile(mobile: &str) -> Result<(), ValidationError> {
    let bytes = mobile.as_bytes();
    let ok = bytes.len() == 11
        && bytes[0] == b'1'
        && (b'3'..=b'9').contains(&bytes[1])
        && bytes.iter().all(|b| b.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("mobile_format"))
    }
}

/// Usernames must not consist of digits only (would collide with mobile login).
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if !username.is_empty() && username.chars().all(|c| c.is_ascii_digit()) {
        Err(ValidationError::new("username_all_digits"))
    } else {
        Ok(())
    }
}
