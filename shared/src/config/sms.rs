//! SMS delivery configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{env_parse, env_string};

/// Gateway used to deliver OTP messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsProvider {
    /// Log-only sender for development and tests
    Mock,
    /// Twilio Programmable Messaging
    Twilio,
}

impl FromStr for SmsProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(SmsProvider::Mock),
            "twilio" => Ok(SmsProvider::Twilio),
            _ => Err(format!("Invalid SMS provider: {}", s)),
        }
    }
}

/// SMS provider selection and credentials
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    pub provider: SmsProvider,

    /// Twilio account SID
    #[serde(default)]
    pub twilio_account_sid: String,

    /// Twilio auth token
    #[serde(default)]
    pub twilio_auth_token: String,

    /// Sender number registered with Twilio
    #[serde(default)]
    pub twilio_from_number: String,

    /// HTTP request timeout for the gateway in seconds
    pub request_timeout_seconds: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: SmsProvider::Mock,
            twilio_account_sid: String::new(),
            twilio_auth_token: String::new(),
            twilio_from_number: String::new(),
            request_timeout_seconds: 10,
        }
    }
}

impl SmsConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: env_parse("SMS_PROVIDER", defaults.provider),
            twilio_account_sid: env_string("TWILIO_ACCOUNT_SID", ""),
            twilio_auth_token: env_string("TWILIO_AUTH_TOKEN", ""),
            twilio_from_number: env_string("TWILIO_FROM_NUMBER", ""),
            request_timeout_seconds: env_parse(
                "SMS_REQUEST_TIMEOUT_SECONDS",
                defaults.request_timeout_seconds,
            ),
        }
    }

    /// All three Twilio credentials are present
    pub fn has_twilio_credentials(&self) -> bool {
        !self.twilio_account_sid.is_empty()
            && !self.twilio_auth_token.is_empty()
            && !self.twilio_from_number.is_empty()
    }
}
