//! Outbound notifications
//!
//! Dispatch is fire-and-forget: a failed send never fails the request
//! that triggered it.

use async_trait::async_trait;

#[async_trait]
pub trait SmsNotifier: Send + Sync {
    async fn send_code(&self, mobile: &str, code: &str, ttl_minutes: i64);
}

/// Logs instead of calling a provider. 开发环境用。
pub struct LogSmsNotifier;

#[async_trait]
impl SmsNotifier for LogSmsNotifier {
    async fn send_code(&self, mobile: &str, code: &str, ttl_minutes: i64) {
        tracing::info!(mobile, code, ttl_minutes, "SMS verification code (log-only notifier)");
    }
}
