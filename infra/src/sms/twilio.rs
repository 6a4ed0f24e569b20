//! Twilio SMS sender
//!
//! Posts to the Programmable Messaging REST API with basic auth. Rate limits
//! (429) and server errors are retried with exponential backoff; other client
//! errors fail immediately.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use pp_core::domain::entities::OtpPurpose;
use pp_core::services::otp::SmsSender;
use pp_shared::phone::{mask_phone_number, normalize_mobile};
use pp_shared::{OtpConfig, SmsConfig};

use super::otp_message;
use crate::InfrastructureError;

pub const TWILIO_API_BASE_URL: &str = "https://api.twilio.com/2010-04-01";

/// Twilio sender configuration
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Twilio Account SID
    pub account_sid: String,
    /// Twilio Auth Token
    pub auth_token: String,
    /// From phone number (must be a Twilio phone number)
    pub from_number: String,
    /// Prefix added to bare national numbers, e.g. `+91`
    pub default_country_code: String,
    /// Lifetime quoted in the message body
    pub code_ttl_minutes: u64,
    /// Maximum send attempts
    pub max_retries: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
    /// Timeout for API requests in seconds
    pub request_timeout_secs: u64,
    /// API root, overridable for tests
    pub api_base_url: String,
}

impl TwilioConfig {
    /// Build from the application SMS and OTP settings
    pub fn from_settings(sms: &SmsConfig, otp: &OtpConfig) -> Result<Self, InfrastructureError> {
        if !sms.has_twilio_credentials() {
            return Err(InfrastructureError::Config(
                "TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_FROM_NUMBER must be set"
                    .to_string(),
            ));
        }

        if !sms.twilio_from_number.starts_with('+') {
            return Err(InfrastructureError::Config(
                "TWILIO_FROM_NUMBER must be in E.164 format (starting with '+')".to_string(),
            ));
        }

        Ok(Self {
            account_sid: sms.twilio_account_sid.clone(),
            auth_token: sms.twilio_auth_token.clone(),
            from_number: sms.twilio_from_number.clone(),
            default_country_code: otp.default_country_code.clone(),
            code_ttl_minutes: (otp.code_ttl_seconds + 59) / 60,
            max_retries: 3,
            retry_delay_ms: 1000,
            request_timeout_secs: sms.request_timeout_seconds,
            api_base_url: TWILIO_API_BASE_URL.to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.api_base_url.trim_end_matches('/'),
            self.account_sid
        )
    }
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    code: Option<i64>,
    message: String,
}

/// Twilio SMS sender
pub struct TwilioSmsSender {
    client: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioSmsSender {
    pub fn new(config: TwilioConfig) -> Result<Self, InfrastructureError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(
            from = %mask_phone_number(&config.from_number),
            "Twilio SMS sender initialized"
        );

        Ok(Self { client, config })
    }

    /// Format a mobile number as E.164, prefixing the default country code
    /// when the number has none
    pub fn to_e164(&self, mobile: &str) -> String {
        let trimmed = mobile.trim();
        if trimmed.starts_with('+') {
            format!("+{}", normalize_mobile(trimmed))
        } else {
            format!(
                "{}{}",
                self.config.default_country_code,
                normalize_mobile(trimmed)
            )
        }
    }

    /// Send SMS with retry logic
    async fn send_with_retry(&self, to: &str, body: &str) -> Result<String, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        loop {
            attempts += 1;
            debug!(
                attempt = attempts,
                max_retries = self.config.max_retries,
                to = %mask_phone_number(to),
                "Sending SMS via Twilio"
            );

            let retryable = match self.send_once(to, body).await {
                Ok(sid) => {
                    info!(to = %mask_phone_number(to), sid = %sid, "SMS sent via Twilio");
                    return Ok(sid);
                }
                Err(SendFailure::Retryable(e)) => e,
                Err(SendFailure::Fatal(e)) => {
                    error!(to = %mask_phone_number(to), error = %e, "Twilio rejected SMS");
                    return Err(e);
                }
            };

            if attempts >= self.config.max_retries {
                error!(
                    attempts = attempts,
                    error = %retryable,
                    "Failed to send SMS via Twilio"
                );
                return Err(InfrastructureError::Sms(format!(
                    "Failed to send SMS after {} attempts: {}",
                    attempts, retryable
                )));
            }

            warn!(
                attempt = attempts,
                error = %retryable,
                retry_in_ms = delay.as_millis() as u64,
                "Twilio send failed, retrying"
            );
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(Duration::from_secs(10));
        }
    }

    async fn send_once(&self, to: &str, body: &str) -> Result<String, SendFailure> {
        let response = self
            .client
            .post(self.config.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", to),
                ("From", self.config.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    SendFailure::Retryable(e.into())
                } else {
                    SendFailure::Fatal(e.into())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            let message: MessageResponse = response
                .json()
                .await
                .map_err(|e| SendFailure::Fatal(e.into()))?;
            return Ok(message.sid);
        }

        let detail = match response.json::<ErrorResponse>().await {
            Ok(body) => format!(
                "{} (code {})",
                body.message,
                body.code.map_or_else(|| "none".to_string(), |c| c.to_string())
            ),
            Err(_) => status.to_string(),
        };
        let err = InfrastructureError::Sms(format!("Twilio returned {}: {}", status, detail));

        if is_retryable_status(status) {
            Err(SendFailure::Retryable(err))
        } else {
            Err(SendFailure::Fatal(err))
        }
    }
}

enum SendFailure {
    Retryable(InfrastructureError),
    Fatal(InfrastructureError),
}

pub(crate) fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl SmsSender for TwilioSmsSender {
    async fn send_otp(
        &self,
        mobile: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<String, String> {
        let to = self.to_e164(mobile);
        let body = otp_message(code, purpose, self.config.code_ttl_minutes);
        self.send_with_retry(&to, &body)
            .await
            .map_err(|e| e.to_string())
    }
}
