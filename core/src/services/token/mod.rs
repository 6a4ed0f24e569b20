//! Token issuing for authenticated sessions
//!
//! Login and completed registration both end with a bearer token whose
//! subject is the user id.

mod config;
mod service;


pub use config::TokenServiceConfig;
pub use service::{JwtTokenIssuer, TokenIssuer};
