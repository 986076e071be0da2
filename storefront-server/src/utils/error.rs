//! 统一错误处理
//!
//! 错误类型定义在 `shared::error`，这里只做 re-export 并提供
//! 处理器常用的请求校验辅助函数。
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::not_found("User not found"))
//!
//! // 校验请求体 (validator 派生规则)
//! validate(&payload)?;
//! ```

use validator::Validate;

// Re-export unified error types from shared
pub use shared::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// Run `validator` field rules, flattening failures into one message
///
/// 输出形如 "mobile: mobile_format; password: length"
pub fn validate(payload: &impl Validate) -> Result<(), AppError> {
    payload.validate().map_err(|errs| {
        let mut parts: Vec<String> = errs
            .field_errors()
            .iter()
            .map(|(field, errors)| {
                let codes: Vec<&str> = errors.iter().map(|e| e.code.as_ref()).collect();
                format!("{}: {}", field, codes.join(", "))
            })
            .collect();
        parts.sort();
        AppError::validation(parts.join("; "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 5))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_validate_collects_fields() {
        let probe = Probe {
            name: "ab".into(),
            email: "not-an-email".into(),
        };
        let err = validate(&probe).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(err.message.contains("name: length"));
        assert!(err.message.contains("email: email"));
    }

    #[test]
    fn test_validate_passes_clean_payload() {
        let probe = Probe {
            name: "alice".into(),
            email: "alice@example.com".into(),
        };
        assert!(validate(&probe).is_ok());
    }
}
