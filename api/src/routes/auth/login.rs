use actix_web::{web, HttpResponse};
use validator::Validate;

use pp_core::repositories::{OtpChallengeRepository, UserRepository};
use pp_core::services::otp::SmsSender;
use pp_core::services::token::TokenIssuer;
use pp_shared::phone::mask_phone_number;
use pp_shared::ApiResponse;

use crate::dto::{LoginResponse, PasswordLoginRequest};
use crate::handlers::ApiError;
use crate::routes::AppState;

/// Handler for POST /api/auth/login
///
/// Password sign-in for an account created through the registration flow.
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
/// ## Errors
/// - 400 Bad Request: `VALIDATION_ERROR`
/// - 401 Unauthorized: `INVALID_CREDENTIALS` for an unknown mobile or a wrong password
pub async fn password_login<S, U, M, T>(
    state: web::Data<AppState<S, U, M, T>>,
    request: web::Json<PasswordLoginRequest>,
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
        "Processing password login request"
    );

    let login = state
        .otp_service
        .login_with_password(&request.mobile, &request.password)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Login successful",
        LoginResponse::from(login),
    )))
}
