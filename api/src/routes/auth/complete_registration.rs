use actix_web::{web, HttpResponse};
use validator::Validate;

use pp_core::repositories::{OtpChallengeRepository, UserRepository};
use pp_core::services::otp::SmsSender;
use pp_core::services::token::TokenIssuer;
use pp_shared::phone::mask_phone_number;
use pp_shared::ApiResponse;

use crate::dto::{CompleteRegistrationRequest, CompleteRegistrationResponse};
use crate::handlers::ApiError;
use crate::routes::AppState;

/// Handler for POST /api/auth/complete-registration
///
/// Creates the account for a mobile whose registration OTP was verified and
/// returns a bearer token.
///
/// # Request Body
///
/// ```json
/// {
///     "mobile": "9876543210",
///     "password": "s3cret!"
/// }
/// ```
///
/// ## Success (201 Created)
/// `data.token` and `data.user`
///
/// ## Errors
/// - 400 Bad Request: `VALIDATION_ERROR`, `VERIFICATION_REQUIRED`
/// - 409 Conflict: `USER_ALREADY_EXISTS`
pub async fn complete_registration<S, U, M, T>(
    state: web::Data<AppState<S, U, M, T>>,
    request: web::Json<CompleteRegistrationRequest>,
) -> Result<HttpResponse, ApiError>
where
    S: OtpChallengeRepository + 'static,
    U: UserRepository + 'static,
    M: SmsSender + 'static,
    T: TokenIssuer + 'static,
{
    request.validate()?;

    tracing::info!(
        mobile = %mask_phone_number(&request.mobile),
        "Processing complete registration request"
    );

    let completed = state
        .otp_service
        .complete_registration(&request.mobile, &request.password)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(
        "Registration completed successfully",
        CompleteRegistrationResponse::from(completed),
    )))
}
