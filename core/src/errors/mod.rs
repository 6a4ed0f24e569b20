//! Domain-specific error types and error handling.

mod types;


pub use types::{OtpError, ValidationError};

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Store, token or hashing failure; the message is for logs only
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// Stable machine-readable code, e.g. `OTP_EXPIRED`
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Otp(err) => err.error_code(),
            DomainError::Validation(err) => err.error_code(),
            DomainError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, DomainError::Internal { .. })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
