//! Configuration for the OTP lifecycle manager

use chrono::Duration;
use pp_shared::OtpConfig;

use crate::domain::entities::otp_challenge::{
    DEFAULT_TTL_SECONDS, MAX_ATTEMPTS, RESEND_COOLDOWN_SECONDS,
};

/// Re-reads allowed after a stale compare-and-swap
pub const DEFAULT_MAX_CAS_RETRIES: u32 = 3;

/// Configuration for the OTP lifecycle manager
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Lifetime of a challenge
    pub code_ttl: Duration,
    /// Failed guesses allowed per challenge
    pub max_attempts: u32,
    /// Minimum age of the current challenge before a resend
    pub resend_cooldown: Duration,
    /// Upper bound on one SMS dispatch
    pub sms_timeout: std::time::Duration,
    /// Return generated codes to the caller (development only)
    pub expose_code: bool,
    /// Attempts at a verify when the store reports a stale write
    pub max_cas_retries: u32,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            code_ttl: Duration::seconds(DEFAULT_TTL_SECONDS),
            max_attempts: MAX_ATTEMPTS,
            resend_cooldown: Duration::seconds(RESEND_COOLDOWN_SECONDS),
            sms_timeout: std::time::Duration::from_secs(10),
            expose_code: false,
            max_cas_retries: DEFAULT_MAX_CAS_RETRIES,
        }
    }
}

impl From<&OtpConfig> for OtpServiceConfig {
    fn from(config: &OtpConfig) -> Self {
        Self {
            code_ttl: Duration::seconds(config.code_ttl_seconds as i64),
            max_attempts: config.max_attempts,
            resend_cooldown: Duration::seconds(config.resend_cooldown_seconds as i64),
            sms_timeout: config.sms_timeout(),
            expose_code: config.expose_code,
            max_cas_retries: DEFAULT_MAX_CAS_RETRIES,
        }
    }
}

impl OtpServiceConfig {
    /// Challenge lifetime in whole seconds
    pub fn ttl_seconds(&self) -> u64 {
        self.code_ttl.num_seconds().max(0) as u64
    }
}
