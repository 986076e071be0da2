//! User API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::{CurrentUser, hash_password};
use crate::core::ServerState;
use crate::db::repository::{sku, user};
use crate::kv::CodeCheck;
use crate::utils::{AppError, AppResult, ErrorCode, validate};
use shared::models::{AuthTokenResponse, EmailUpdate, RegisterRequest, SkuView, UserProfile};

/// POST /api/users - 注册
///
/// 字段规则由 validator 派生约束检查；跨字段规则 (两次密码一致、
/// 同意条款、短信验证码) 在这里检查。
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<AuthTokenResponse>> {
    validate(&payload)?;
    if payload.password != payload.password2 {
        return Err(AppError::validation("password2: does not match password"));
    }
    if !payload.allow {
        return Err(AppError::validation("allow: terms must be accepted"));
    }

    // 短信验证码 (注册用途不消费，过期自动失效)
    match state.verify_codes.check(&payload.mobile, &payload.sms_code)? {
        CodeCheck::Valid => {}
        CodeCheck::Missing => return Err(AppError::new(ErrorCode::SmsCodeExpired)),
        CodeCheck::Mismatch => return Err(AppError::new(ErrorCode::SmsCodeMismatch)),
    }

    let db = state.get_db();

    if user::count_by_username(&db, &payload.username).await? > 0 {
        return Err(AppError::with_message(
            ErrorCode::UsernameExists,
            format!("Username {} is taken", payload.username),
        ));
    }
    if user::count_by_mobile(&db, &payload.mobile).await? > 0 {
        return Err(AppError::with_message(
            ErrorCode::MobileExists,
            format!("Mobile {} is already registered", payload.mobile),
        ));
    }

    let password_hash = hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;

    let account = user::create(&db, &payload.username, &password_hash, &payload.mobile).await?;

    let token = state
        .get_jwt_service()
        .generate_token(account.id, &account.username)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        user_id = account.id,
        username = %account.username,
        "User registered"
    );

    Ok(Json(AuthTokenResponse {
        user_id: account.id,
        username: account.username,
        token,
    }))
}

/// 用户名占用查询响应
#[derive(Serialize)]
pub struct UsernameCountView {
    pub username: String,
    pub count: i64,
}

/// GET /api/users/username/{username}/count - 注册页用户名可用性查询
pub async fn username_count(
    State(state): State<ServerState>,
    Path(username): Path<String>,
) -> AppResult<Json<UsernameCountView>> {
    let count = user::count_by_username(&state.pool, &username).await?;
    Ok(Json(UsernameCountView { username, count }))
}

/// 手机号占用查询响应
#[derive(Serialize)]
pub struct MobileCountView {
    pub mobile: String,
    pub count: i64,
}

/// GET /api/users/mobile/{mobile}/count - 注册页手机号可用性查询
pub async fn mobile_count(
    State(state): State<ServerState>,
    Path(mobile): Path<String>,
) -> AppResult<Json<MobileCountView>> {
    let count = user::count_by_mobile(&state.pool, &mobile).await?;
    Ok(Json(MobileCountView { mobile, count }))
}

/// PUT /api/users/email - 绑定邮箱
///
/// 保存邮箱 (重置验证状态) 并签发验证令牌。邮件发送是 log-only：
/// 验证链接直接写进日志，开发环境从日志里取。
pub async fn update_email(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<EmailUpdate>,
) -> AppResult<Json<UserProfile>> {
    validate(&payload)?;

    let db = state.get_db();
    user::set_email(&db, current_user.id, &payload.email).await?;

    let token = state
        .get_jwt_service()
        .generate_email_token(current_user.id, &current_user.username, &payload.email)
        .map_err(|e| AppError::internal(format!("Failed to generate email token: {}", e)))?;

    tracing::info!(
        user_id = current_user.id,
        email = %payload.email,
        url = %format!("/api/users/email/verification?token={}", token),
        "Email verification link issued (log-only mailer)"
    );

    let account = user::find_by_id(&db, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", current_user.id)))?;

    Ok(Json(UserProfile::from(account)))
}

#[derive(Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

/// 邮箱验证结果响应
#[derive(Serialize)]
pub struct EmailVerifiedView {
    pub verified: bool,
}

/// GET /api/users/email/verification?token=xxx - 邮箱验证回跳
///
/// 令牌里带着签发时的邮箱；用户在点链接前更换了邮箱则令牌作废。
pub async fn verify_email(
    State(state): State<ServerState>,
    Query(query): Query<VerifyEmailQuery>,
) -> AppResult<Json<EmailVerifiedView>> {
    let (user_id, email) = state
        .get_jwt_service()
        .validate_email_token(&query.token)
        .map_err(|e| AppError::with_message(ErrorCode::EmailTokenInvalid, e.to_string()))?;

    let db = state.get_db();
    let account = user::find_by_id(&db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", user_id)))?;

    if account.email.as_deref() != Some(email.as_str()) {
        return Err(AppError::with_message(
            ErrorCode::EmailTokenInvalid,
            "Email changed since the link was issued",
        ));
    }

    user::mark_email_verified(&db, user_id).await?;

    tracing::info!(user_id, email = %email, "Email verified");

    Ok(Json(EmailVerifiedView { verified: true }))
}

/// GET /api/users/browse_histories - 最近浏览的商品 (最新在前)
pub async fn browse_histories(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<SkuView>>> {
    let ids = state.history.list(current_user.id)?;
    let skus = sku::find_many(&state.pool, &ids).await?;

    // find_many 的返回顺序由 IN 子句决定，这里按历史顺序重排
    let mut by_id: std::collections::HashMap<i64, SkuView> =
        skus.into_iter().map(|s| (s.id, SkuView::from(s))).collect();
    let views = ids.iter().filter_map(|id| by_id.remove(id)).collect();

    Ok(Json(views))
}

#[derive(Deserialize)]
pub struct HistoryPush {
    pub sku_id: i64,
}

/// POST /api/users/browse_histories - 记录一次商品浏览
pub async fn push_browse_history(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<HistoryPush>,
) -> AppResult<Json<SkuView>> {
    let item = sku::find_by_id(&state.pool, payload.sku_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::SkuNotFound,
                format!("Sku {} not found", payload.sku_id),
            )
        })?;

    state.history.push(current_user.id, payload.sku_id)?;

    Ok(Json(SkuView::from(item)))
}
