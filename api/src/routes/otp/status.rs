use actix_web::{web, HttpResponse};

use pp_core::repositories::{OtpChallengeRepository, UserRepository};
use pp_core::services::otp::SmsSender;
use pp_core::services::token::TokenIssuer;
use pp_shared::ApiResponse;

use crate::dto::{validate_mobile, OtpStatusResponse, PurposeQuery};
use crate::handlers::ApiError;
use crate::routes::AppState;

/// Handler for GET /api/otp/status/{mobile}?purpose=registration
///
/// Describes the current challenge, consumed or not, without its code.
/// Answers 404 `NO_ACTIVE_OTP` when nothing unexpired exists.
pub async fn otp_status<S, U, M, T>(
    state: web::Data<AppState<S, U, M, T>>,
    mobile: web::Path<String>,
    query: web::Query<PurposeQuery>,
) -> Result<HttpResponse, ApiError>
where
    S: OtpChallengeRepository + 'static,
    U: UserRepository + 'static,
    M: SmsSender + 'static,
    T: TokenIssuer + 'static,
{
    let mobile = mobile.into_inner();
    if let Err(error) = validate_mobile(&mobile) {
        let mut errors = validator::ValidationErrors::new();
        errors.add("mobile", error);
        return Err(errors.into());
    }
    let purpose = query.purpose()?;

    let status = state.otp_service.get_status(&mobile, purpose).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "OTP status retrieved",
        OtpStatusResponse::from(status),
    )))
}
