//! Bearer token configuration

use serde::{Deserialize, Serialize};

use super::{env_parse, env_string};

const DEFAULT_SECRET: &str = "your-secret-key-change-in-production";

/// JWT configuration for tokens issued after login and registration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// HMAC secret used for HS256 signing
    pub secret: String,

    /// Token lifetime in seconds
    pub expiry_seconds: i64,

    /// JWT issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_SECRET),
            expiry_seconds: 30 * 86400, // 30 days
            issuer: String::from("palmpay"),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: env_string("JWT_SECRET", DEFAULT_SECRET),
            expiry_seconds: env_parse("JWT_EXPIRE_DAYS", defaults.expiry_seconds / 86400) * 86400,
            issuer: env_string("JWT_ISSUER", &defaults.issuer),
        }
    }

    /// Set token expiry in days
    pub fn with_expiry_days(mut self, days: i64) -> Self {
        self.expiry_seconds = days * 86400;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}
