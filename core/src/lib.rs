//! # PalmPay Core
//!
//! Core business logic for the mobile OTP verification lifecycle.
//! This crate contains domain entities, the OTP lifecycle manager, repository
//! interfaces with in-memory implementations, and error types.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
