//! Authentication Handlers
//!
//! Handles login and current-user lookup

use std::time::Duration;

use axum::{Extension, Json, extract::State};

use crate::AppError;
use crate::auth::{CurrentUser, verify_password};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use shared::models::{AuthTokenResponse, LoginRequest, UserProfile};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Login handler
///
/// Authenticates user credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthTokenResponse>, AppError> {
    let db = state.get_db();

    let account = user::find_by_username(&db, &req.username).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Check authentication result - unified error message to prevent username enumeration
    let account = match account {
        Some(u) => {
            let password_valid = verify_password(&u.password_hash, &req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

            if !password_valid {
                security_log!("WARN", "login_failed", username = req.username.clone());
                tracing::warn!(username = %req.username, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            u
        }
        None => {
            security_log!("WARN", "login_failed", username = req.username.clone());
            tracing::warn!(username = %req.username, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    // Generate JWT token
    let jwt_service = state.get_jwt_service();
    let token = jwt_service
        .generate_token(account.id, &account.username)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        user_id = account.id,
        username = %account.username,
        "User logged in successfully"
    );

    Ok(Json(AuthTokenResponse {
        user_id: account.id,
        username: account.username,
        token,
    }))
}

/// Get current user profile
pub async fn me(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<UserProfile>, AppError> {
    let db = state.get_db();

    let account = user::find_by_id(&db, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", current_user.id)))?;

    Ok(Json(UserProfile::from(account)))
}
