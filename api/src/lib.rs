//! # PalmPay API
//!
//! actix-web transport for the OTP verification lifecycle. Handlers are
//! generic over the challenge store, user store, SMS sender and token issuer
//! so tests can run the full HTTP surface against in-memory stores.

pub mod backends;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use backends::{build_stores, ChallengeStore, UserStore};
pub use handlers::error::ApiError;
pub use routes::{configure, AppState};
