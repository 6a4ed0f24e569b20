pub mod otp_challenge;
pub mod user;

pub use otp_challenge::{InMemoryOtpChallengeRepository, OtpChallengeRepository, SaveOutcome};
pub use user::{InMemoryUserRepository, UserRepository};
