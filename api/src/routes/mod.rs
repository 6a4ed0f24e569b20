//! Route table and shared application state
//!
//! - `otp` - send, resend, verify, validate and status
//! - `auth` - registration completion, password login and the current user
//! - `health` - liveness probe

pub mod auth;
pub mod health;
pub mod otp;

use actix_web::{web, HttpResponse};
use std::sync::Arc;

use pp_core::repositories::{OtpChallengeRepository, UserRepository};
use pp_core::services::otp::{OtpService, SmsSender};
use pp_core::services::token::TokenIssuer;
use pp_shared::ApiResponse;

use crate::handlers::{json_error_handler, path_error_handler, query_error_handler};

/// Application state that holds shared services
pub struct AppState<S, U, M, T>
where
    S: OtpChallengeRepository,
    U: UserRepository,
    M: SmsSender,
    T: TokenIssuer,
{
    pub otp_service: Arc<OtpService<S, U, M, T>>,
}

impl<S, U, M, T> AppState<S, U, M, T>
where
    S: OtpChallengeRepository,
    U: UserRepository,
    M: SmsSender,
    T: TokenIssuer,
{
    pub fn new(otp_service: Arc<OtpService<S, U, M, T>>) -> Self {
        Self { otp_service }
    }
}

/// Register every route and the extractor error handlers
///
/// The caller provides `web::Data<AppState<S, U, M, T>>`.
pub fn configure<S, U, M, T>(cfg: &mut web::ServiceConfig)
where
    S: OtpChallengeRepository + 'static,
    U: UserRepository + 'static,
    M: SmsSender + 'static,
    T: TokenIssuer + 'static,
{
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/otp")
                        .route("/send", web::post().to(otp::send::send_otp::<S, U, M, T>))
                        .route("/resend", web::post().to(otp::resend::resend_otp::<S, U, M, T>))
                        .route("/verify", web::post().to(otp::verify::verify_otp::<S, U, M, T>))
                        .route(
                            "/validate",
                            web::post().to(otp::validate::validate_otp::<S, U, M, T>),
                        )
                        .route(
                            "/status/{mobile}",
                            web::get().to(otp::status::otp_status::<S, U, M, T>),
                        ),
                )
                .service(
                    web::scope("/auth")
                        .route(
                            "/complete-registration",
                            web::post().to(
                                auth::complete_registration::complete_registration::<S, U, M, T>,
                            ),
                        )
                        .route("/login", web::post().to(auth::login::password_login::<S, U, M, T>))
                        .route("/me", web::get().to(auth::me::current_user::<S, U, M, T>)),
                ),
        )
        .default_service(web::route().to(not_found));
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error(
        "NOT_FOUND",
        "The requested resource was not found",
    ))
}
