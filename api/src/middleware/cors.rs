//! CORS middleware configuration for cross-origin requests.
//!
//! Outside production an empty origin list allows any origin so mobile
//! emulators and local tooling can reach the API. In production only the
//! configured origins are accepted.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use pp_shared::{Environment, ServerConfig};

/// Seconds browsers may cache a preflight response
const PREFLIGHT_MAX_AGE: usize = 3600;

/// Creates a CORS middleware instance for the given environment.
pub fn create_cors(server: &ServerConfig, environment: Environment) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-requested-with"),
            header::HeaderName::from_static("x-request-id"),
        ])
        .expose_headers(vec![
            header::RETRY_AFTER,
            header::HeaderName::from_static("x-request-id"),
        ])
        .max_age(PREFLIGHT_MAX_AGE);

    if server.allowed_origins.is_empty() && !environment.is_production() {
        tracing::info!(environment = %environment, "CORS allows any origin");
        return cors.allow_any_origin();
    }

    server.allowed_origins.iter().fold(cors, |cors, origin| {
        tracing::info!(origin = %origin, "Adding allowed origin");
        cors.allowed_origin(origin)
    })
}
