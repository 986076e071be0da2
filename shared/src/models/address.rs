//! Shipping address model

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validate_mobile;

/// Maximum live (non-deleted) addresses per user
pub const USER_ADDRESS_LIMIT: i64 = 20;

/// Address entity (soft-deleted via `is_deleted`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Address {
    pub id: i64,
    pub user_id: i64,
    /// User-chosen label for the address
    pub title: String,
    pub receiver: String,
    pub province: String,
    pub city: String,
    pub district: String,
    /// Street-level detail
    pub place: String,
    pub mobile: String,
    pub tel: Option<String>,
    pub email: Option<String>,
    pub is_deleted: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// API view (drops the soft-delete flag, marks the default)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressView {
    pub id: i64,
    pub title: String,
    pub receiver: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub place: String,
    pub mobile: String,
    pub tel: Option<String>,
    pub email: Option<String>,
    pub is_default: bool,
}

impl AddressView {
    pub fn from_entity(a: Address, default_address_id: Option<i64>) -> Self {
        Self {
            is_default: default_address_id == Some(a.id),
            id: a.id,
            title: a.title,
            receiver: a.receiver,
            province: a.province,
            city: a.city,
            district: a.district,
            place: a.place,
            mobile: a.mobile,
            tel: a.tel,
            email: a.email,
        }
    }
}

/// Create/full-update payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddressCreate {
    #[validate(length(min = 1, max = 20))]
    pub title: String,
    #[validate(length(min = 1, max = 20))]
    pub receiver: String,
    #[validate(length(min = 1, max = 20))]
    pub province: String,
    #[validate(length(min = 1, max = 20))]
    pub city: String,
    #[validate(length(min = 1, max = 20))]
    pub district: String,
    #[validate(length(min = 1, max = 50))]
    pub place: String,
    #[validate(custom(function = validate_mobile))]
    pub mobile: String,
    pub tel: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

/// Title-only update payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddressTitleUpdate {
    #[validate(length(min = 1, max = 20))]
    pub title: String,
}
