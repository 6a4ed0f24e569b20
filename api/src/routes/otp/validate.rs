use actix_web::{web, HttpResponse};
use validator::Validate;

use pp_core::repositories::{OtpChallengeRepository, UserRepository};
use pp_core::services::otp::SmsSender;
use pp_core::services::token::TokenIssuer;
use pp_shared::ApiResponse;

use crate::dto::{OtpCodeRequest, ValidateOtpResponse};
use crate::handlers::ApiError;
use crate::routes::AppState;

/// Handler for POST /api/otp/validate
///
/// Checks a code without consuming the challenge. Wrong guesses here do not
/// count against the attempt budget.
pub async fn validate_otp<S, U, M, T>(
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
        .validate_without_consuming(&request.mobile, purpose, &request.otp)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "OTP is valid",
        ValidateOtpResponse::from(outcome),
    )))
}
