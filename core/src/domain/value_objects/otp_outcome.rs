//! Results returned by the OTP lifecycle manager.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{OtpPurpose, UserProfile};

/// What the client should do after a successful verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    CompleteRegistration,
    Dashboard,
    ResetPassword,
    AccountVerified,
}

impl NextStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            NextStep::CompleteRegistration => "complete_registration",
            NextStep::Dashboard => "dashboard",
            NextStep::ResetPassword => "reset_password",
            NextStep::AccountVerified => "account_verified",
        }
    }
}

/// A challenge was created and handed to the SMS channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeIssued {
    pub mobile: String,
    pub purpose: OtpPurpose,
    /// Lifetime in seconds
    pub expires_in: u64,
    /// Only populated when code exposure is enabled (development)
    pub code: Option<String>,
}

/// Purpose-specific result of a successful verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    RegistrationPending {
        mobile: String,
        challenge_id: Uuid,
        next_step: NextStep,
    },
    LoggedIn {
        token: String,
        user: UserProfile,
        next_step: NextStep,
    },
    PasswordResetAllowed {
        user_id: Uuid,
        next_step: NextStep,
    },
    AccountVerified {
        user_id: Uuid,
        next_step: NextStep,
    },
}

impl VerifyOutcome {
    pub fn next_step(&self) -> NextStep {
        match self {
            VerifyOutcome::RegistrationPending { next_step, .. }
            | VerifyOutcome::LoggedIn { next_step, .. }
            | VerifyOutcome::PasswordResetAllowed { next_step, .. }
            | VerifyOutcome::AccountVerified { next_step, .. } => *next_step,
        }
    }

    /// Human-readable summary for the response envelope
    pub fn message(&self) -> &'static str {
        match self {
            VerifyOutcome::RegistrationPending { .. } => {
                "OTP verified successfully. Please complete your registration."
            }
            VerifyOutcome::LoggedIn { .. } => "Login successful",
            VerifyOutcome::PasswordResetAllowed { .. } => {
                "OTP verified successfully. You can now reset your password."
            }
            VerifyOutcome::AccountVerified { .. } => "Account verified successfully",
        }
    }
}

/// Read-only view of the current challenge; never carries the code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub mobile: String,
    pub purpose: OtpPurpose,
    /// Whole seconds until expiry, rounded up
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

/// Result of a non-consuming code check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub valid: bool,
}

/// A verified registration turned into an account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationCompleted {
    pub token: String,
    pub user: UserProfile,
}

/// A registered user signed in with their password
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCompleted {
    pub token: String,
    pub user: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_step_serialization() {
        assert_eq!(
            serde_json::to_value(NextStep::CompleteRegistration).unwrap(),
            serde_json::json!("complete_registration")
        );
        assert_eq!(NextStep::Dashboard.as_str(), "dashboard");
    }

    #[test]
    fn test_verify_outcome_next_step() {
        let outcome = VerifyOutcome::PasswordResetAllowed {
            user_id: Uuid::new_v4(),
            next_step: NextStep::ResetPassword,
        };
        assert_eq!(outcome.next_step(), NextStep::ResetPassword);
        assert!(outcome.message().contains("reset your password"));
    }
}
