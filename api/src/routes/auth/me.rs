use actix_web::{web, HttpResponse};

use pp_core::repositories::{OtpChallengeRepository, UserRepository};
use pp_core::services::otp::SmsSender;
use pp_core::services::token::TokenIssuer;
use pp_shared::ApiResponse;

use crate::dto::CurrentUserResponse;
use crate::handlers::ApiError;
use crate::middleware::BearerToken;
use crate::routes::AppState;

/// Handler for GET /api/auth/me
///
/// Returns the account a bearer token was issued for. Missing, forged,
/// expired and orphaned tokens all answer 401 `INVALID_TOKEN`.
pub async fn current_user<S, U, M, T>(
    state: web::Data<AppState<S, U, M, T>>,
    token: BearerToken,
) -> Result<HttpResponse, ApiError>
where
    S: OtpChallengeRepository + 'static,
    U: UserRepository + 'static,
    M: SmsSender + 'static,
    T: TokenIssuer + 'static,
{
    let user = state.otp_service.authenticate(&token.0).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "User retrieved",
        CurrentUserResponse { user },
    )))
}
