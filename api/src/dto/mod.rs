//! Request and response bodies
//!
//! JSON keys are camelCase on the wire. Requests carry `validator` rules;
//! responses are built from the core outcome types.

pub mod auth_dto;
pub mod otp_dto;

pub use auth_dto::{
    CompleteRegistrationRequest, CompleteRegistrationResponse, CurrentUserResponse,
    LoginResponse, PasswordLoginRequest,
};
pub use otp_dto::{
    OtpCodeRequest, OtpIssuedResponse, OtpStatusResponse, PurposeQuery, SendOtpRequest,
    ValidateOtpResponse, VerifyOtpResponse,
};

use once_cell::sync::Lazy;
use pp_shared::phone::is_valid_mobile;
use regex::Regex;
use std::borrow::Cow;
use validator::ValidationError;

/// Exactly six ASCII digits
pub static OTP_CODE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{6}$").unwrap());

/// Mobile numbers must normalize to a 10-digit national number
pub fn validate_mobile(mobile: &str) -> Result<(), ValidationError> {
    if is_valid_mobile(mobile) {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_mobile");
        error.message = Some(Cow::from("Mobile number must contain exactly 10 digits"));
        Err(error)
    }
}
