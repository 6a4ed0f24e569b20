//! Middleware configuration
//!
//! Request tracing comes from `tracing_actix_web::TracingLogger`. This module
//! builds the CORS policy and the bearer token extractor.

pub mod auth;
pub mod cors;

pub use auth::{extract_bearer_token, BearerToken};
pub use cors::create_cors;
