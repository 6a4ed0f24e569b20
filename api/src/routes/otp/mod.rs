//! OTP route handlers
//!
//! This module contains the challenge lifecycle endpoints:
//! - Sending and resending a code
//! - Verifying (consuming) and validating (non-consuming) a code
//! - Reading the status of the current challenge

pub mod resend;
pub mod send;
pub mod status;
pub mod validate;
pub mod verify;
