//! OTP challenge entity for mobile verification.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::OtpError;

/// Maximum number of failed guesses before the challenge is destroyed
pub const MAX_ATTEMPTS: u32 = 5;

/// Length of the OTP code
pub const CODE_LENGTH: usize = 6;

/// Default lifetime of a challenge (10 minutes)
pub const DEFAULT_TTL_SECONDS: i64 = 600;

/// Minimum age of a challenge before another one may be sent
pub const RESEND_COOLDOWN_SECONDS: i64 = 30;

const CODE_MIN: u32 = 100_000;
const CODE_MAX: u32 = 999_999;

/// What a challenge authorizes once verified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    #[default]
    Registration,
    Login,
    PasswordReset,
    AccountVerification,
}

impl OtpPurpose {
    pub const ALL: [OtpPurpose; 4] = [
        OtpPurpose::Registration,
        OtpPurpose::Login,
        OtpPurpose::PasswordReset,
        OtpPurpose::AccountVerification,
    ];

    /// Wire and storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Registration => "registration",
            OtpPurpose::Login => "login",
            OtpPurpose::PasswordReset => "password_reset",
            OtpPurpose::AccountVerification => "account_verification",
        }
    }
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OtpPurpose {
    type Err = OtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OtpPurpose::ALL
            .into_iter()
            .find(|purpose| purpose.as_str() == s)
            .ok_or_else(|| OtpError::InvalidPurpose {
                purpose: s.to_string(),
            })
    }
}

/// A single OTP issued to a (mobile, purpose) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpChallenge {
    /// Unique identifier for the challenge
    pub id: Uuid,

    /// Normalized mobile number, digits only
    pub mobile: String,

    pub purpose: OtpPurpose,

    /// The 6-digit code
    pub code: String,

    /// Failed guesses so far
    pub attempts: u32,

    pub max_attempts: u32,

    /// Set once a matching guess consumed the challenge
    pub is_used: bool,

    /// Set together with `is_used` on successful verification
    pub verified: bool,

    /// Revision counter for compare-and-swap saves
    pub version: u64,

    pub created_at: DateTime<Utc>,

    /// The challenge is unusable at or after this instant
    pub expires_at: DateTime<Utc>,
}

impl OtpChallenge {
    /// Creates a challenge with a freshly generated code
    ///
    /// # Arguments
    ///
    /// * `mobile` - Normalized mobile number
    /// * `purpose` - What the challenge authorizes
    /// * `ttl` - Lifetime from now
    /// * `max_attempts` - Failed guesses allowed
    pub fn new(mobile: String, purpose: OtpPurpose, ttl: Duration, max_attempts: u32) -> Self {
        Self::with_code(mobile, purpose, Self::generate_code(), ttl, max_attempts)
    }

    /// Creates a challenge with a known code
    pub fn with_code(
        mobile: String,
        purpose: OtpPurpose,
        code: String,
        ttl: Duration,
        max_attempts: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            mobile,
            purpose,
            code,
            attempts: 0,
            max_attempts,
            is_used: false,
            verified: false,
            version: 0,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Uniform draw over 100000..=999999 from the OS CSPRNG
    pub fn generate_code() -> String {
        OsRng.gen_range(CODE_MIN..=CODE_MAX).to_string()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Not consumed and not expired
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && !self.is_expired_at(now)
    }

    /// Constant-time comparison against the stored code
    pub fn matches(&self, submitted: &str) -> bool {
        constant_time_eq(self.code.as_bytes(), submitted.as_bytes())
    }

    pub fn remaining_attempts(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }

    pub fn has_reached_max_attempts(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Count a failed guess, never past `max_attempts`
    ///
    /// # Returns
    ///
    /// The number of attempts left after this one
    pub fn record_failed_attempt(&mut self) -> u32 {
        self.attempts = (self.attempts + 1).min(self.max_attempts);
        self.remaining_attempts()
    }

    /// Consume the challenge after a matching guess
    pub fn mark_verified(&mut self) {
        self.is_used = true;
        self.verified = true;
    }

    /// Whole seconds until expiry, rounded up, zero once expired
    pub fn expires_in_at(&self, now: DateTime<Utc>) -> u64 {
        ceil_seconds(self.expires_at - now)
    }

    /// Seconds a caller must wait before a resend, rounded up
    ///
    /// Returns `None` when the challenge is at least `cooldown` old. A returned
    /// value always lies in `1..=cooldown`.
    pub fn resend_wait_at(&self, now: DateTime<Utc>, cooldown: Duration) -> Option<u64> {
        let elapsed = now - self.created_at;
        if elapsed >= cooldown {
            return None;
        }
        let cooldown_secs = ceil_seconds(cooldown).max(1);
        Some(ceil_seconds(cooldown - elapsed).clamp(1, cooldown_secs))
    }
}

fn ceil_seconds(duration: Duration) -> u64 {
    let millis = duration.num_milliseconds();
    if millis <= 0 {
        0
    } else {
        ((millis + 999) / 1000) as u64
    }
}
