//! Cache configuration module

use serde::{Deserialize, Serialize};

use super::{env_parse, env_string};

/// Redis configuration for the challenge store
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Prefix prepended to every key
    pub key_prefix: String,

    /// Connection attempts before giving up
    pub max_retries: u32,

    /// Delay before the first reconnect in milliseconds, doubled per attempt
    pub retry_delay_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            key_prefix: String::from("otp"),
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env_string("REDIS_URL", &defaults.url),
            key_prefix: env_string("REDIS_KEY_PREFIX", &defaults.key_prefix),
            max_retries: env_parse("REDIS_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_parse("REDIS_RETRY_DELAY_MS", defaults.retry_delay_ms),
        }
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for all cache keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        if self.key_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.key_prefix, key)
        }
    }
}
