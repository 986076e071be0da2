//! Unified error codes for the storefront backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: User/account errors
//! - 3xxx: Cart errors
//! - 4xxx: Order errors
//! - 5xxx: Payment/settlement errors
//! - 6xxx: Product errors
//! - 7xxx: Address errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: User ====================
    /// Username is already taken
    UsernameExists = 2001,
    /// Mobile number is already registered
    MobileExists = 2002,
    /// SMS verification code expired or was never issued
    SmsCodeExpired = 2003,
    /// SMS verification code does not match
    SmsCodeMismatch = 2004,
    /// SMS code requested again within the cooldown window
    SmsSendTooFrequent = 2005,
    /// Email verification token is invalid or expired
    EmailTokenInvalid = 2006,

    // ==================== 3xxx: Cart ====================
    /// No selected items in the cart
    CartEmpty = 3001,
    /// Cart item not found
    CartItemNotFound = 3002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Requested quantity exceeds available stock
    InsufficientStock = 4002,
    /// Order placement failed (contention exhaustion or commit failure)
    OrderPlacementFailed = 4003,

    // ==================== 5xxx: Payment ====================
    /// Settlement callback references a missing/foreign/non-pending order
    InvalidOrderReference = 5001,
    /// Gateway signature verification failed
    SignatureInvalid = 5002,
    /// Payment record not found
    PaymentNotFound = 5003,

    // ==================== 6xxx: Product ====================
    /// SKU not found
    SkuNotFound = 6001,

    // ==================== 7xxx: Address ====================
    /// Address not found
    AddressNotFound = 7001,
    /// User reached the live-address cap
    AddressLimitReached = 7002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Key-value storage error
    StorageError = 9003,
    /// Configuration error
    ConfigError = 9004,
}

impl ErrorCode {
    /// Numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Default human-readable message for the code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",

            Self::NotAuthenticated => "Not authenticated",
            Self::InvalidCredentials => "Invalid username or password",
            Self::TokenExpired => "Token has expired",
            Self::TokenInvalid => "Token is invalid",

            Self::UsernameExists => "Username is already taken",
            Self::MobileExists => "Mobile number is already registered",
            Self::SmsCodeExpired => "SMS verification code has expired",
            Self::SmsCodeMismatch => "SMS verification code is incorrect",
            Self::SmsSendTooFrequent => "SMS code requested too frequently",
            Self::EmailTokenInvalid => "Email verification token is invalid",

            Self::CartEmpty => "No selected items in the cart",
            Self::CartItemNotFound => "Cart item not found",

            Self::OrderNotFound => "Order not found",
            Self::InsufficientStock => "Insufficient stock",
            Self::OrderPlacementFailed => "Order placement failed",

            Self::InvalidOrderReference => "Invalid order reference",
            Self::SignatureInvalid => "Signature verification failed",
            Self::PaymentNotFound => "Payment record not found",

            Self::SkuNotFound => "SKU not found",

            Self::AddressNotFound => "Address not found",
            Self::AddressLimitReached => "Address limit reached",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::StorageError => "Storage error",
            Self::ConfigError => "Configuration error",
        }
    }

    /// Category for this code (derived from the numeric range)
    pub fn category(&self) -> super::ErrorCategory {
        super::ErrorCategory::from_code(self.code())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error type returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,

            1001 => Self::NotAuthenticated,
            1002 => Self::InvalidCredentials,
            1003 => Self::TokenExpired,
            1004 => Self::TokenInvalid,

            2001 => Self::UsernameExists,
            2002 => Self::MobileExists,
            2003 => Self::SmsCodeExpired,
            2004 => Self::SmsCodeMismatch,
            2005 => Self::SmsSendTooFrequent,
            2006 => Self::EmailTokenInvalid,

            3001 => Self::CartEmpty,
            3002 => Self::CartItemNotFound,

            4001 => Self::OrderNotFound,
            4002 => Self::InsufficientStock,
            4003 => Self::OrderPlacementFailed,

            5001 => Self::InvalidOrderReference,
            5002 => Self::SignatureInvalid,
            5003 => Self::PaymentNotFound,

            6001 => Self::SkuNotFound,

            7001 => Self::AddressNotFound,
            7002 => Self::AddressLimitReached,

            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9003 => Self::StorageError,
            9004 => Self::ConfigError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for code in [
            ErrorCode::Success,
            ErrorCode::InsufficientStock,
            ErrorCode::OrderPlacementFailed,
            ErrorCode::InvalidOrderReference,
            ErrorCode::StorageError,
        ] {
            let n = code.code();
            assert_eq!(ErrorCode::try_from(n).unwrap(), code);
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert_eq!(ErrorCode::try_from(54321), Err(InvalidErrorCode(54321)));
    }
}
