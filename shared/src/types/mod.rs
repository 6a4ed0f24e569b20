//! Type definitions shared by the transport layer
//!
//! - `response` - API response envelope and health check payload

pub mod response;

pub use response::{ApiResponse, HealthResponse, HealthStatus};
