//! Bearer token extraction for authenticated routes.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest};
use std::future::{ready, Ready};

use pp_core::errors::{DomainError, ValidationError};

use crate::handlers::ApiError;

/// Raw token from an `Authorization: Bearer <token>` header
///
/// Extraction fails with `INVALID_TOKEN` when the header is missing or uses
/// another scheme; the token itself is checked by the handler.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl FromRequest for BearerToken {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = extract_bearer_token(req).map(BearerToken).ok_or_else(|| {
            tracing::debug!(path = %req.path(), "Request without a bearer token");
            ApiError::Domain(DomainError::Validation(ValidationError::InvalidToken))
        });
        ready(result)
    }
}

/// Extracts the token from a Bearer Authorization header
pub fn extract_bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
