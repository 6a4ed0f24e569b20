//! # Infrastructure Layer
//!
//! Concrete implementations of the stores and collaborators the OTP
//! lifecycle manager depends on.
//!
//! ## Architecture
//!
//! - **Database**: MySQL challenge and user repositories using SQLx
//! - **Cache**: Redis client and a TTL-backed challenge store
//! - **SMS**: Mock and Twilio senders
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis challenge storage (default)
//! - `twilio-sms`: Enable the Twilio SMS sender (default)

use pp_core::errors::DomainError;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Cache module - Redis client and challenge store
#[cfg(feature = "redis-cache")]
pub mod cache;

/// SMS module - Outbound OTP delivery
pub mod sms;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database error
    #[cfg(feature = "mysql")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error
    #[cfg(feature = "mysql")]
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Redis error
    #[cfg(feature = "redis-cache")]
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[cfg(feature = "twilio-sms")]
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stored data could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS service error
    #[error("SMS service error: {0}")]
    Sms(String),

    /// A stored row violated an invariant
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Internal {
            message: err.to_string(),
        }
    }
}
