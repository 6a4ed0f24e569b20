//! Domain entities representing core business objects.

pub mod otp_challenge;
pub mod token;
pub mod user;

// Re-export commonly used types
pub use otp_challenge::{
    OtpChallenge, OtpPurpose, CODE_LENGTH, DEFAULT_TTL_SECONDS, MAX_ATTEMPTS,
    RESEND_COOLDOWN_SECONDS,
};
pub use token::{Claims, JWT_ISSUER, TOKEN_EXPIRY_DAYS};
pub use user::{User, UserProfile};
