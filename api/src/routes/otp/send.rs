use actix_web::{web, HttpResponse};
use validator::Validate;

use pp_core::repositories::{OtpChallengeRepository, UserRepository};
use pp_core::services::otp::SmsSender;
use pp_core::services::token::TokenIssuer;
use pp_shared::phone::mask_phone_number;
use pp_shared::ApiResponse;

use crate::dto::{OtpIssuedResponse, SendOtpRequest};
use crate::handlers::ApiError;
use crate::routes::AppState;

/// Handler for POST /api/otp/send
///
/// Issues a fresh challenge for the mobile and purpose, superseding any
/// previous one. The code is only echoed back when code exposure is enabled.
///
/// # Request Body
///
/// ```json
/// {
///     "mobile": "9876543210",
///     "purpose": "registration"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "success": true,
///     "message": "OTP sent successfully",
///     "data": {
///         "mobile": "9876543210",
///         "purpose": "registration",
///         "expiresIn": 600,
///         "otp": "482913"
///     }
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: `VALIDATION_ERROR`, `INVALID_PURPOSE`
pub async fn send_otp<S, U, M, T>(
    state: web::Data<AppState<S, U, M, T>>,
    request: web::Json<SendOtpRequest>,
) -> Result<HttpResponse, ApiError>
where
    S: OtpChallengeRepository + 'static,
    U: UserRepository + 'static,
    M: SmsSender + 'static,
    T: TokenIssuer + 'static,
{
    request.validate()?;
    let purpose = request.purpose()?;

    tracing::info!(
        mobile = %mask_phone_number(&request.mobile),
        purpose = %purpose,
        "Processing send OTP request"
    );

    let issued = state
        .otp_service
        .request_challenge(&request.mobile, purpose)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "OTP sent successfully",
        OtpIssuedResponse::from(issued),
    )))
}
