//! Shared types for the storefront backend
//!
//! Common types used by the server crate and integration tests:
//! - Entity models and request/response DTOs (`models`)
//! - Unified error codes, `AppError` and the `ApiResponse` envelope (`error`)
//! - ID and money utilities (`util`)
//!
//! Database derives (`sqlx::FromRow` / `sqlx::Type`) are gated behind the
//! `db` feature so non-server consumers stay lean.

pub mod error;
pub mod models;
pub mod util;

// Re-export the unified error types
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
