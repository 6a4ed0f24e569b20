//! OTP lifecycle policy configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use super::{env_parse, env_string, Environment};

/// Policy knobs for challenge generation, verification and delivery
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Lifetime of a challenge in seconds
    pub code_ttl_seconds: u64,

    /// Failed guesses allowed before the challenge is destroyed
    pub max_attempts: u32,

    /// Minimum age of the current challenge before a resend is allowed
    pub resend_cooldown_seconds: u64,

    /// Upper bound on a single SMS dispatch in milliseconds
    pub sms_timeout_ms: u64,

    /// Echo generated codes in API responses (development only)
    pub expose_code: bool,

    /// Country code accepted as a prefix on stored phone numbers
    pub default_country_code: String,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_ttl_seconds: 600,
            max_attempts: 5,
            resend_cooldown_seconds: 30,
            sms_timeout_ms: 10_000,
            expose_code: false,
            default_country_code: String::from("+91"),
        }
    }
}

impl OtpConfig {
    /// Defaults for an environment; only development exposes codes
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            expose_code: environment.is_development(),
            ..Default::default()
        }
    }

    /// Create from `OTP_*` environment variables
    pub fn from_env(environment: Environment) -> Self {
        let defaults = Self::for_environment(environment);
        Self {
            code_ttl_seconds: env_parse("OTP_CODE_TTL_SECONDS", defaults.code_ttl_seconds),
            max_attempts: env_parse("OTP_MAX_ATTEMPTS", defaults.max_attempts),
            resend_cooldown_seconds: env_parse(
                "OTP_RESEND_COOLDOWN_SECONDS",
                defaults.resend_cooldown_seconds,
            ),
            sms_timeout_ms: env_parse("OTP_SMS_TIMEOUT_MS", defaults.sms_timeout_ms),
            expose_code: env_parse("OTP_EXPOSE_CODE", defaults.expose_code),
            default_country_code: env_string(
                "OTP_DEFAULT_COUNTRY_CODE",
                &defaults.default_country_code,
            ),
        }
    }

    pub fn code_ttl(&self) -> Duration {
        Duration::from_secs(self.code_ttl_seconds)
    }

    pub fn resend_cooldown(&self) -> Duration {
        Duration::from_secs(self.resend_cooldown_seconds)
    }

    pub fn sms_timeout(&self) -> Duration {
        Duration::from_millis(self.sms_timeout_ms)
    }
}

/// Backend holding OTP challenges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local map; challenges vanish on restart
    Memory,
    /// `otp_challenges` table
    MySql,
    /// One expiring key per challenge
    Redis,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            "mysql" => Ok(StoreBackend::MySql),
            "redis" => Ok(StoreBackend::Redis),
            _ => Err(format!("Invalid OTP store backend: {}", s)),
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::MySql => write!(f, "mysql"),
            StoreBackend::Redis => write!(f, "redis"),
        }
    }
}

/// Background purge of expired challenges
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweeperConfig {
    /// Start the sweeper task with the server
    pub enabled: bool,

    /// Seconds between two sweeps
    pub interval_seconds: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 300,
        }
    }
}

impl SweeperConfig {
    /// Create from `OTP_SWEEPER_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_parse("OTP_SWEEPER_ENABLED", defaults.enabled),
            interval_seconds: env_parse("OTP_SWEEPER_INTERVAL_SECONDS", defaults.interval_seconds),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds.max(1))
    }
}
