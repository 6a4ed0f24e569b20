use actix_web::{web, HttpResponse};
use validator::Validate;

use pp_core::repositories::{OtpChallengeRepository, UserRepository};
use pp_core::services::otp::SmsSender;
use pp_core::services::token::TokenIssuer;
use pp_shared::phone::mask_phone_number;
use pp_shared::ApiResponse;

use crate::dto::{OtpCodeRequest, VerifyOtpResponse};
use crate::handlers::ApiError;
use crate::routes::AppState;

/// Handler for POST /api/otp/verify
///
/// Consumes the challenge on a matching code and runs the purpose-specific
/// follow-up.
///
/// # Request Body
///
/// ```json
/// {
///     "mobile": "9876543210",
///     "otp": "482913",
///     "purpose": "login"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// - registration: `mobile`, `challengeId`, `nextStep: complete_registration`
/// - login: `token`, `user`, `nextStep: dashboard`
/// - password_reset: `userId`, `nextStep: reset_password`
/// - account_verification: `userId`, `nextStep: account_verified`
///
/// ## Errors
/// - 400 Bad Request: `OTP_EXPIRED`, `MAX_ATTEMPTS_EXCEEDED`,
///   `INVALID_OTP` (with `remainingAttempts`), `INVALID_PURPOSE`
/// - 404 Not Found: `USER_NOT_FOUND`
/// - 409 Conflict: `USER_ALREADY_EXISTS`, `CONCURRENT_MODIFICATION`
pub async fn verify_otp<S, U, M, T>(
    state: web::Data<AppState<S, U, M, T>>,
    request: web::Json<OtpCodeRequest>,
) -> Result<HttpResponse, ApiError>
where
    S: OtpChallengeRepository + 'static,
    U: UserRepository + 'static,
    M: SmsSender + 'static,
    T: TokenIssuer + 'static,
{
    request.validate()?;
    let purpose = request.purpose()?;

    let outcome = state
        .otp_service
        .verify_challenge(&request.mobile, purpose, &request.otp)
        .await
        .map_err(|e| {
            tracing::warn!(
                mobile = %mask_phone_number(&request.mobile),
                purpose = %purpose,
                code = e.error_code(),
                "OTP verification rejected"
            );
            e
        })?;

    let message = outcome.message();
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        message,
        VerifyOtpResponse::from_outcome(purpose, outcome),
    )))
}
