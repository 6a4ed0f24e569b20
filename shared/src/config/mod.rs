//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - JWT bearer token configuration
//! - `cache` - Redis connection configuration
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `otp` - OTP lifecycle policy, storage backend and expiry sweeper
//! - `server` - HTTP server configuration
//! - `sms` - SMS delivery provider configuration

pub mod auth;
pub mod cache;
pub mod database;
pub mod environment;
pub mod otp;
pub mod server;
pub mod sms;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

// Re-export commonly used types
pub use auth::JwtConfig;
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LoggingConfig};
pub use otp::{OtpConfig, StoreBackend, SweeperConfig};
pub use server::ServerConfig;
pub use sms::{SmsConfig, SmsProvider};

/// Prefix for layered environment overrides, e.g. `PALMPAY__OTP__MAX_ATTEMPTS=3`
pub const ENV_OVERRIDE_PREFIX: &str = "PALMPAY";

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Redis configuration
    pub cache: CacheConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// OTP policy configuration
    pub otp: OtpConfig,

    /// Which backend stores OTP challenges
    pub store: StoreBackend,

    /// Expiry sweeper configuration
    #[serde(default)]
    pub sweeper: SweeperConfig,

    /// SMS delivery configuration
    pub sms: SmsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Defaults appropriate for the given environment
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            jwt: JwtConfig::default(),
            otp: OtpConfig::for_environment(environment),
            store: if environment.is_production() {
                StoreBackend::MySql
            } else {
                StoreBackend::Memory
            },
            sweeper: SweeperConfig::default(),
            sms: SmsConfig::default(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        let defaults = Self::for_environment(environment);

        Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            jwt: JwtConfig::from_env(),
            otp: OtpConfig::from_env(environment),
            store: env_parse("OTP_STORE", defaults.store),
            sweeper: SweeperConfig::from_env(),
            sms: SmsConfig::from_env(),
            logging: defaults.logging,
        }
    }

    /// Load layered configuration
    ///
    /// Layers, lowest precedence first:
    /// 1. `.env` file and plain environment variables (`from_env`)
    /// 2. Optional `config/<environment>.toml`
    /// 3. `PALMPAY__`-prefixed environment variables
    ///
    /// The result is validated before it is returned.
    pub fn load() -> Result<Self, AppConfigError> {
        dotenvy::dotenv().ok();

        let base = Self::from_env();
        let settings = ::config::Config::builder()
            .add_source(::config::Config::try_from(&base)?)
            .add_source(::config::File::with_name(base.environment.config_file()).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_OVERRIDE_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: Self = settings.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject combinations that must never reach a running server
    pub fn validate(&self) -> Result<(), AppConfigError> {
        if self.otp.expose_code && !self.environment.is_development() {
            return Err(AppConfigError::Invalid(format!(
                "otp.expose_code is only allowed in development (environment: {})",
                self.environment
            )));
        }

        if self.environment.is_production() && self.jwt.is_using_default_secret() {
            return Err(AppConfigError::Invalid(
                "JWT_SECRET must be set in production".to_string(),
            ));
        }

        if self.otp.max_attempts == 0 {
            return Err(AppConfigError::Invalid(
                "otp.max_attempts must be at least 1".to_string(),
            ));
        }

        if self.otp.code_ttl_seconds == 0 {
            return Err(AppConfigError::Invalid(
                "otp.code_ttl_seconds must be positive".to_string(),
            ));
        }

        if self.sms.provider == SmsProvider::Twilio && !self.sms.has_twilio_credentials() {
            return Err(AppConfigError::Invalid(
                "Twilio provider selected but TWILIO_* credentials are missing".to_string(),
            ));
        }

        Ok(())
    }
}

/// Read and parse an environment variable, falling back to `default`
pub(crate) fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// Read a string environment variable, falling back to `default`
pub(crate) fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
