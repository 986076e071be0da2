//! User account model

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{validate_mobile, validate_username};

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    /// argon2 hash, never serialized out
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub mobile: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub default_address_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Public profile view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub mobile: String,
    pub email: Option<String>,
    pub email_verified: bool,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            mobile: u.mobile,
            email: u.email,
            email_verified: u.email_verified,
        }
    }
}

/// Registration payload
///
/// The password confirmation and terms flag are checked in the handler
/// (cross-field rules); field-level shape rules live here.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 5, max = 20), custom(function = validate_username))]
    pub username: String,
    #[validate(length(min = 8, max = 20))]
    pub password: String,
    pub password2: String,
    #[validate(custom(function = validate_mobile))]
    pub mobile: String,
    #[validate(length(equal = 6))]
    pub sms_code: String,
    /// Terms-of-service agreement, must be true
    pub allow: bool,
}

/// Login payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token response shared by register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokenResponse {
    pub user_id: i64,
    pub username: String,
    pub token: String,
}

/// Email update payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmailUpdate {
    #[validate(email)]
    pub email: String,
}
