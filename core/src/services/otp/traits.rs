//! Traits for SMS delivery integration

use async_trait::async_trait;

use crate::domain::entities::OtpPurpose;

/// Delivers OTP codes to a handset
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send `code` to `mobile`, returning the provider's message id
    async fn send_otp(&self, mobile: &str, code: &str, purpose: OtpPurpose)
        -> Result<String, String>;
}
