//! Value objects representing immutable domain concepts.

pub mod otp_outcome;

pub use otp_outcome::{
    ChallengeIssued, LoginCompleted, NextStep, RegistrationCompleted, StatusSnapshot, ValidationOutcome,
    VerifyOutcome,
};
