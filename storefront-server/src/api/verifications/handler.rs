//! SMS Verification Code Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use rand::Rng;
use serde::Serialize;

use crate::core::ServerState;
use crate::kv::IssueOutcome;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::validate_mobile;

/// 验证码发送结果
#[derive(Serialize)]
pub struct SmsSendView {
    pub mobile: String,
    /// 有效期 (秒)
    pub expires_in: i64,
}

/// POST /api/sms_codes/{mobile} - 发送注册验证码
///
/// 同一手机号一个冷却窗口内只发一次；命中冷却返回 SmsSendTooFrequent，
/// 原验证码继续有效。
pub async fn send_sms_code(
    State(state): State<ServerState>,
    Path(mobile): Path<String>,
) -> AppResult<Json<SmsSendView>> {
    if validate_mobile(&mobile).is_err() {
        return Err(AppError::validation("mobile: mobile_format"));
    }

    let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));

    let outcome = state.verify_codes.issue(
        &mobile,
        &code,
        state.config.sms_code_ttl_secs,
        state.config.sms_send_cooldown_secs,
    )?;

    if outcome == IssueOutcome::Throttled {
        return Err(AppError::new(ErrorCode::SmsSendTooFrequent));
    }

    state
        .sms
        .send_code(&mobile, &code, state.config.sms_code_ttl_secs / 60)
        .await;

    Ok(Json(SmsSendView {
        mobile,
        expires_in: state.config.sms_code_ttl_secs,
    }))
}
