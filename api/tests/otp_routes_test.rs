//! HTTP tests for the OTP endpoints

mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, App};
use serde_json::json;

use common::{context, get, json_body, post, MOBILE};

#[actix_web::test]
async fn test_send_otp_returns_code_in_development() {
    let ctx = context(true);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(common::routes)).await;

    let resp = test::call_service(
        &app,
        post("/api/otp/send", json!({"mobile": MOBILE})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "OTP sent successfully");
    assert_eq!(body["data"]["mobile"], MOBILE);
    assert_eq!(body["data"]["purpose"], "registration");
    assert_eq!(body["data"]["expiresIn"], 600);
    assert_eq!(body["data"]["otp"].as_str().unwrap().len(), 6);
    assert!(body.get("code").is_none());
    assert_eq!(ctx.sms.get_message_count(), 1);
}

#[actix_web::test]
async fn test_send_otp_hides_code_by_default() {
    let ctx = context(false);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(common::routes)).await;

    let resp = test::call_service(
        &app,
        post("/api/otp/send", json!({"mobile": "98765-43210", "purpose": "login"})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["data"]["mobile"], MOBILE);
    assert_eq!(body["data"]["purpose"], "login");
    assert!(body["data"].get("otp").is_none());
}

#[actix_web::test]
async fn test_send_otp_rejects_invalid_mobile() {
    let ctx = context(true);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(common::routes)).await;

    let resp = test::call_service(
        &app,
        post("/api/otp/send", json!({"mobile": "12345"})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = json_body(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(
        body["message"],
        "Mobile number must contain exactly 10 digits"
    );
    assert!(body["data"]["fields"]["mobile"].is_array());
    assert_eq!(ctx.sms.get_message_count(), 0);
}

#[actix_web::test]
async fn test_malformed_json_is_a_validation_error() {
    let ctx = context(true);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(common::routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/otp/send")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"mobile\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = json_body(resp).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn test_unknown_purpose_is_rejected() {
    let ctx = context(true);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(common::routes)).await;

    let resp = test::call_service(
        &app,
        post("/api/otp/send", json!({"mobile": MOBILE, "purpose": "transfer"})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = json_body(resp).await;
    assert_eq!(body["code"], "INVALID_PURPOSE");
}

#[actix_web::test]
async fn test_resend_within_cooldown_is_rate_limited() {
    let ctx = context(true);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(common::routes)).await;

    let resp = test::call_service(
        &app,
        post("/api/otp/send", json!({"mobile": MOBILE})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        post("/api/otp/resend", json!({"mobile": MOBILE})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_header: u64 = resp
        .headers()
        .get(header::RETRY_AFTER)
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=30).contains(&retry_header));

    let body = json_body(resp).await;
    assert_eq!(body["code"], "RATE_LIMITED");
    assert_eq!(body["data"]["retryAfter"], retry_header);
    assert_eq!(ctx.sms.get_message_count(), 1);
}

#[actix_web::test]
async fn test_resend_without_challenge_issues_one() {
    let ctx = context(true);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(common::routes)).await;

    let resp = test::call_service(
        &app,
        post("/api/otp/resend", json!({"mobile": MOBILE, "purpose": "login"})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["message"], "OTP resent successfully");
}

#[actix_web::test]
async fn test_wrong_code_reports_remaining_attempts() {
    let ctx = context(true);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(common::routes)).await;

    let resp = test::call_service(
        &app,
        post("/api/otp/send", json!({"mobile": MOBILE})).to_request(),
    )
    .await;
    let code = json_body(resp).await["data"]["otp"]
        .as_str()
        .unwrap()
        .to_string();
    let wrong = if code == "000000" { "111111" } else { "000000" };

    for expected_remaining in (1..=4).rev() {
        let resp = test::call_service(
            &app,
            post("/api/otp/verify", json!({"mobile": MOBILE, "otp": wrong})).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = json_body(resp).await;
        assert_eq!(body["code"], "INVALID_OTP");
        assert_eq!(body["data"]["remainingAttempts"], expected_remaining);
    }

    let resp = test::call_service(
        &app,
        post("/api/otp/verify", json!({"mobile": MOBILE, "otp": wrong})).to_request(),
    )
    .await;
    assert_eq!(json_body(resp).await["code"], "MAX_ATTEMPTS_EXCEEDED");

    // The capped challenge is gone, so even the right code fails
    let resp = test::call_service(
        &app,
        post("/api/otp/verify", json!({"mobile": MOBILE, "otp": code})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["code"], "OTP_EXPIRED");
}

#[actix_web::test]
async fn test_verify_rejects_non_numeric_code() {
    let ctx = context(true);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(common::routes)).await;

    let resp = test::call_service(
        &app,
        post("/api/otp/verify", json!({"mobile": MOBILE, "otp": "12ab56"})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = json_body(resp).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "OTP must be exactly 6 digits");
}

#[actix_web::test]
async fn test_verify_without_challenge_is_expired() {
    let ctx = context(true);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(common::routes)).await;

    let resp = test::call_service(
        &app,
        post("/api/otp/verify", json!({"mobile": MOBILE, "otp": "123456"})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["code"], "OTP_EXPIRED");
}

#[actix_web::test]
async fn test_login_for_unknown_user_is_not_found() {
    let ctx = context(true);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(common::routes)).await;

    let resp = test::call_service(
        &app,
        post("/api/otp/send", json!({"mobile": MOBILE, "purpose": "login"})).to_request(),
    )
    .await;
    let code = json_body(resp).await["data"]["otp"].clone();

    let resp = test::call_service(
        &app,
        post(
            "/api/otp/verify",
            json!({"mobile": MOBILE, "otp": code, "purpose": "login"}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["code"], "USER_NOT_FOUND");
}

#[actix_web::test]
async fn test_validate_does_not_consume_or_count() {
    let ctx = context(true);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(common::routes)).await;

    let resp = test::call_service(
        &app,
        post("/api/otp/send", json!({"mobile": MOBILE})).to_request(),
    )
    .await;
    let code = json_body(resp).await["data"]["otp"]
        .as_str()
        .unwrap()
        .to_string();
    let wrong = if code == "999999" { "888888" } else { "999999" };

    let resp = test::call_service(
        &app,
        post("/api/otp/validate", json!({"mobile": MOBILE, "otp": wrong})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["code"], "INVALID_OTP");
    assert_eq!(body["data"]["remainingAttempts"], 5);

    let resp = test::call_service(
        &app,
        post("/api/otp/validate", json!({"mobile": MOBILE, "otp": code})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["data"]["valid"], true);

    let resp = test::call_service(
        &app,
        get(&format!("/api/otp/status/{}", MOBILE)).to_request(),
    )
    .await;
    let body = json_body(resp).await;
    assert_eq!(body["data"]["attempts"], 0);
    assert_eq!(body["data"]["isUsed"], false);

    // Still consumable after validation
    let resp = test::call_service(
        &app,
        post("/api/otp/verify", json!({"mobile": MOBILE, "otp": code})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_status_reports_current_challenge() {
    let ctx = context(true);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(common::routes)).await;

    let resp = test::call_service(
        &app,
        post(
            "/api/otp/send",
            json!({"mobile": MOBILE, "purpose": "password_reset"}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        get(&format!("/api/otp/status/{}?purpose=password_reset", MOBILE)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let data = json_body(resp).await["data"].clone();
    assert_eq!(data["purpose"], "password_reset");
    assert_eq!(data["attempts"], 0);
    assert_eq!(data["maxAttempts"], 5);
    assert_eq!(data["remainingAttempts"], 5);
    assert_eq!(data["canResend"], false);
    assert_eq!(data["isUsed"], false);
    assert_eq!(data["verified"], false);
    assert!(data["expiresIn"].as_u64().unwrap() <= 600);
    assert!(data["createdAt"].is_string());
    assert!(data["expiresAt"].is_string());
    assert!(data.get("otp").is_none());
    assert!(data.get("code").is_none());

    // Purposes are independent
    let resp = test::call_service(
        &app,
        get(&format!("/api/otp/status/{}?purpose=login", MOBILE)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["code"], "NO_ACTIVE_OTP");
}

#[actix_web::test]
async fn test_status_rejects_invalid_mobile() {
    let ctx = context(true);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(common::routes)).await;

    let resp = test::call_service(&app, get("/api/otp/status/12345").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["code"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn test_health_and_unknown_routes() {
    let ctx = context(true);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(common::routes)).await;

    let resp = test::call_service(&app, get("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");

    let resp = test::call_service(&app, get("/api/otp/unknown").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["code"], "NOT_FOUND");
}

#[actix_web::test]
async fn test_sms_failure_does_not_fail_send() {
    let ctx = context(true);
    ctx.sms.set_simulate_failure(true);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(common::routes)).await;

    let resp = test::call_service(
        &app,
        post("/api/otp/send", json!({"mobile": MOBILE})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let code = json_body(resp).await["data"]["otp"].clone();

    let resp = test::call_service(
        &app,
        post("/api/otp/verify", json!({"mobile": MOBILE, "otp": code})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}
