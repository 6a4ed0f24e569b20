//! Shared setup for the HTTP tests: in-memory stores, the mock SMS sender
//! and a cheap bcrypt cost.

#![allow(dead_code)]

use actix_web::dev::ServiceResponse;
use actix_web::{test, web};
use serde_json::Value;
use std::sync::Arc;

use pp_api::{configure, AppState};
use pp_core::repositories::{InMemoryOtpChallengeRepository, InMemoryUserRepository};
use pp_core::services::otp::{OtpService, OtpServiceConfig};
use pp_core::services::password::PasswordHasher;
use pp_core::services::token::{JwtTokenIssuer, TokenServiceConfig};
use pp_infra::sms::MockSmsSender;

pub const MOBILE: &str = "9876543210";

pub type TestState =
    AppState<InMemoryOtpChallengeRepository, InMemoryUserRepository, MockSmsSender, JwtTokenIssuer>;

pub struct TestContext {
    pub state: web::Data<TestState>,
    pub users: Arc<InMemoryUserRepository>,
    pub sms: MockSmsSender,
}

pub fn context(expose_code: bool) -> TestContext {
    let users = Arc::new(InMemoryUserRepository::new());
    let sms = MockSmsSender::new();
    let service = OtpService::new(
        Arc::new(InMemoryOtpChallengeRepository::new()),
        users.clone(),
        Arc::new(sms.clone()),
        Arc::new(JwtTokenIssuer::new(TokenServiceConfig::default())),
        OtpServiceConfig {
            expose_code,
            ..OtpServiceConfig::default()
        },
    )
    .with_password_hasher(PasswordHasher::new(4));

    TestContext {
        state: web::Data::new(AppState::new(Arc::new(service))),
        users,
        sms,
    }
}

/// Route table bound to the in-memory types
pub fn routes(cfg: &mut web::ServiceConfig) {
    configure::<InMemoryOtpChallengeRepository, InMemoryUserRepository, MockSmsSender, JwtTokenIssuer>(
        cfg,
    );
}

pub fn post(uri: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post().uri(uri).set_json(body)
}

pub fn get(uri: &str) -> test::TestRequest {
    test::TestRequest::get().uri(uri)
}

pub async fn json_body(resp: ServiceResponse) -> Value {
    test::read_body_json(resp).await
}
