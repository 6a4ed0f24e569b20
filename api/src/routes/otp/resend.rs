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

/// Handler for POST /api/otp/resend
///
/// Same body and success payload as `/api/otp/send`. Answers 429 with a
/// `Retry-After` header and `data.retryAfter` while the current challenge is
/// younger than the resend cooldown.
pub async fn resend_otp<S, U, M, T>(
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
        "Processing resend OTP request"
    );

    let issued = state
        .otp_service
        .resend_challenge(&request.mobile, purpose)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "OTP resent successfully",
        OtpIssuedResponse::from(issued),
    )))
}
