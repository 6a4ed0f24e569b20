use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use pp_core::domain::entities::{OtpPurpose, UserProfile};
use pp_core::domain::value_objects::{
    ChallengeIssued, NextStep, StatusSnapshot, ValidationOutcome, VerifyOutcome,
};
use pp_core::errors::OtpError;

use super::{validate_mobile, OTP_CODE_REGEX};

/// Parse an optional purpose, defaulting to registration
fn parse_purpose(purpose: Option<&str>) -> Result<OtpPurpose, OtpError> {
    match purpose.map(str::trim) {
        None | Some("") => Ok(OtpPurpose::default()),
        Some(value) => value.parse(),
    }
}

/// Body of `POST /api/otp/send` and `POST /api/otp/resend`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    #[validate(custom = "validate_mobile")]
    pub mobile: String,
    #[serde(default)]
    pub purpose: Option<String>,
}

impl SendOtpRequest {
    pub fn purpose(&self) -> Result<OtpPurpose, OtpError> {
        parse_purpose(self.purpose.as_deref())
    }
}

/// Body of `POST /api/otp/verify` and `POST /api/otp/validate`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OtpCodeRequest {
    #[validate(custom = "validate_mobile")]
    pub mobile: String,
    #[validate(regex(path = "OTP_CODE_REGEX", message = "OTP must be exactly 6 digits"))]
    pub otp: String,
    #[serde(default)]
    pub purpose: Option<String>,
}

impl OtpCodeRequest {
    pub fn purpose(&self) -> Result<OtpPurpose, OtpError> {
        parse_purpose(self.purpose.as_deref())
    }
}

/// Query string of `GET /api/otp/status/{mobile}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurposeQuery {
    pub purpose: Option<String>,
}

impl PurposeQuery {
    pub fn purpose(&self) -> Result<OtpPurpose, OtpError> {
        parse_purpose(self.purpose.as_deref())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpIssuedResponse {
    pub mobile: String,
    pub purpose: OtpPurpose,
    /// Seconds until the code expires
    pub expires_in: u64,
    /// Development only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

impl From<ChallengeIssued> for OtpIssuedResponse {
    fn from(issued: ChallengeIssued) -> Self {
        Self {
            mobile: issued.mobile,
            purpose: issued.purpose,
            expires_in: issued.expires_in,
            otp: issued.code,
        }
    }
}

/// Successful verification; which optional fields are present depends on the purpose
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub purpose: OtpPurpose,
    pub next_step: NextStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

impl VerifyOtpResponse {
    pub fn from_outcome(purpose: OtpPurpose, outcome: VerifyOutcome) -> Self {
        let mut response = Self {
            purpose,
            next_step: outcome.next_step(),
            mobile: None,
            challenge_id: None,
            token: None,
            user: None,
            user_id: None,
        };

        match outcome {
            VerifyOutcome::RegistrationPending {
                mobile,
                challenge_id,
                ..
            } => {
                response.mobile = Some(mobile);
                response.challenge_id = Some(challenge_id);
            }
            VerifyOutcome::LoggedIn { token, user, .. } => {
                response.token = Some(token);
                response.user = Some(user);
            }
            VerifyOutcome::PasswordResetAllowed { user_id, .. }
            | VerifyOutcome::AccountVerified { user_id, .. } => {
                response.user_id = Some(user_id);
            }
        }

        response
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidateOtpResponse {
    pub valid: bool,
}

impl From<ValidationOutcome> for ValidateOtpResponse {
    fn from(outcome: ValidationOutcome) -> Self {
        Self {
            valid: outcome.valid,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpStatusResponse {
    pub mobile: String,
    pub purpose: OtpPurpose,
    pub expires_in: u64,
    pub can_resend: bool,
    pub attempts: u32,
    pub max_attempts: u32,
    pub remaining_attempts: u32,
    pub is_used: bool,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<StatusSnapshot> for OtpStatusResponse {
    fn from(status: StatusSnapshot) -> Self {
        Self {
            mobile: status.mobile,
            purpose: status.purpose,
            expires_in: status.expires_in,
            can_resend: status.can_resend,
            attempts: status.attempts,
            max_attempts: status.max_attempts,
            remaining_attempts: status.remaining_attempts,
            is_used: status.is_used,
            verified: status.verified,
            created_at: status.created_at,
            expires_at: status.expires_at,
        }
    }
}
