//! Authentication route handlers

pub mod complete_registration;
pub mod login;
pub mod me;
