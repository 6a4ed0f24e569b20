//! MySQL repository implementations

pub mod otp_challenge_repository_impl;
pub mod user_repository_impl;

pub use otp_challenge_repository_impl::MySqlOtpChallengeRepository;
pub use user_repository_impl::MySqlUserRepository;
