//! OTP lifecycle and input validation error types

use thiserror::Error;

/// Lifecycle and conflict errors raised by the OTP manager
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error("OTP not found or expired. Please request a new OTP.")]
    OtpExpired,

    #[error("Too many failed attempts. Please request a new OTP.")]
    MaxAttemptsExceeded,

    #[error("Invalid OTP. {remaining_attempts} attempts remaining.")]
    InvalidOtp { remaining_attempts: u32 },

    #[error("Please wait {retry_after} seconds before requesting a new OTP.")]
    RateLimited { retry_after: u64 },

    #[error("No active OTP found")]
    NoActiveOtp,

    #[error("User already exists with this mobile number")]
    UserAlreadyExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid OTP purpose: {purpose}")]
    InvalidPurpose { purpose: String },

    #[error("Mobile number must be verified before completing registration")]
    VerificationRequired,

    #[error("OTP was modified concurrently. Please try again.")]
    ConcurrentModification,

    #[error("Invalid mobile number or password")]
    InvalidCredentials,
}

impl OtpError {
    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            OtpError::OtpExpired => "OTP_EXPIRED",
            OtpError::MaxAttemptsExceeded => "MAX_ATTEMPTS_EXCEEDED",
            OtpError::InvalidOtp { .. } => "INVALID_OTP",
            OtpError::RateLimited { .. } => "RATE_LIMITED",
            OtpError::NoActiveOtp => "NO_ACTIVE_OTP",
            OtpError::UserAlreadyExists => "USER_ALREADY_EXISTS",
            OtpError::UserNotFound => "USER_NOT_FOUND",
            OtpError::InvalidPurpose { .. } => "INVALID_PURPOSE",
            OtpError::VerificationRequired => "VERIFICATION_REQUIRED",
            OtpError::ConcurrentModification => "CONCURRENT_MODIFICATION",
            OtpError::InvalidCredentials => "INVALID_CREDENTIALS",
        }
    }
}

/// Client input errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid mobile number: {mobile}")]
    InvalidMobile { mobile: String },

    #[error("OTP must be exactly {length} digits")]
    InvalidCode { length: usize },

    #[error("Password must be at least {min_length} characters")]
    PasswordTooShort { min_length: usize },

    #[error("Field required: {field}")]
    RequiredField { field: String },

    #[error("Invalid or expired token")]
    InvalidToken,
}

impl ValidationError {
    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::InvalidMobile { .. } => "INVALID_MOBILE",
            ValidationError::InvalidCode { .. } => "INVALID_CODE",
            ValidationError::PasswordTooShort { .. } => "PASSWORD_TOO_SHORT",
            ValidationError::RequiredField { .. } => "REQUIRED_FIELD",
            ValidationError::InvalidToken => "INVALID_TOKEN",
        }
    }
}
