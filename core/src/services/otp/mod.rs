//! OTP lifecycle manager
//!
//! This module provides the complete challenge workflow:
//! - Generation, storage and SMS dispatch of purpose-scoped codes
//! - Resend rate limiting
//! - Verification with attempt accounting and single-use consumption
//! - Purpose-specific follow-ups (registration, login, password reset,
//!   account verification)
//! - Read-only status and non-consuming validation

mod config;
mod keyed_locks;
mod service;
mod traits;

#[cfg(test)]
mod tests;

pub use config::{OtpServiceConfig, DEFAULT_MAX_CAS_RETRIES};
pub use keyed_locks::{KeyedLockGuard, KeyedLocks};
pub use service::OtpService;
pub use traits::SmsSender;
