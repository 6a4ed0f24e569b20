//! Business services containing domain logic and use cases.

pub mod otp;
pub mod password;
pub mod sweeper;
pub mod token;

// Re-export commonly used types
pub use otp::{OtpService, OtpServiceConfig, SmsSender};
pub use password::{PasswordHasher, MIN_PASSWORD_LENGTH};
pub use sweeper::{ExpirySweeper, SweepResult};
pub use token::{JwtTokenIssuer, TokenIssuer, TokenServiceConfig};
