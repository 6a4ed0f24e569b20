use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::{header, StatusCode};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;
use validator::ValidationErrors;

use pp_core::errors::{DomainError, OtpError, ValidationError};
use pp_shared::ApiResponse;

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
const INTERNAL_MESSAGE: &str = "An internal error occurred. Please try again later.";

/// Every failure a handler can return
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Field rules rejected the request body
    #[error("{message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    /// The body, path or query could not be decoded
    #[error("{0}")]
    Malformed(String),
}

impl From<OtpError> for ApiError {
    fn from(err: OtpError) -> Self {
        ApiError::Domain(err.into())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let fields: BTreeMap<String, Vec<String>> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        let message = fields
            .values()
            .flatten()
            .next()
            .cloned()
            .unwrap_or_else(|| "Invalid request data".to_string());

        ApiError::Validation { message, fields }
    }
}

impl ApiError {
    /// Stable machine-readable code for the envelope
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Domain(err) => err.error_code(),
            ApiError::Validation { .. } | ApiError::Malformed(_) => VALIDATION_ERROR,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Domain(DomainError::Otp(err)) => match err {
                OtpError::NoActiveOtp | OtpError::UserNotFound => StatusCode::NOT_FOUND,
                OtpError::UserAlreadyExists | OtpError::ConcurrentModification => {
                    StatusCode::CONFLICT
                }
                OtpError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                OtpError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                OtpError::OtpExpired
                | OtpError::MaxAttemptsExceeded
                | OtpError::InvalidOtp { .. }
                | OtpError::InvalidPurpose { .. }
                | OtpError::VerificationRequired => StatusCode::BAD_REQUEST,
            },
            ApiError::Domain(DomainError::Validation(ValidationError::InvalidToken)) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Domain(DomainError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Domain(DomainError::Internal { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Validation { .. } | ApiError::Malformed(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        let code = self.code();

        match self {
            ApiError::Domain(DomainError::Internal { message }) => {
                tracing::error!(error = %message, "Internal error while handling request");
                builder.json(ApiResponse::error(code, INTERNAL_MESSAGE))
            }
            ApiError::Domain(DomainError::Otp(OtpError::InvalidOtp { remaining_attempts })) => {
                builder.json(ApiResponse::error_with_data(
                    code,
                    self.to_string(),
                    json!({ "remainingAttempts": remaining_attempts }),
                ))
            }
            ApiError::Domain(DomainError::Otp(OtpError::RateLimited { retry_after })) => builder
                .insert_header((header::RETRY_AFTER, retry_after.to_string()))
                .json(ApiResponse::error_with_data(
                    code,
                    self.to_string(),
                    json!({ "retryAfter": retry_after }),
                )),
            ApiError::Validation { message, fields } => builder.json(ApiResponse::error_with_data(
                code,
                message.clone(),
                json!({ "fields": fields }),
            )),
            _ => builder.json(ApiResponse::error(code, self.to_string())),
        }
    }
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected malformed JSON body");
    ApiError::Malformed(format!("Invalid request body: {}", err)).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Malformed(format!("Invalid query string: {}", err)).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Malformed(format!("Invalid path: {}", err)).into()
}
