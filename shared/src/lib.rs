//! Shared utilities and common types for the PalmPay server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Phone number utilities
//! - The JSON response envelope

pub mod config;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use self::config::{
    AppConfig, AppConfigError, CacheConfig, DatabaseConfig, Environment, JwtConfig,
    LoggingConfig, OtpConfig, ServerConfig, SmsConfig, SmsProvider, StoreBackend,
    SweeperConfig,
};
pub use self::types::ApiResponse;
pub use self::utils::phone;
