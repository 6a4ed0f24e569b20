//! Unit tests for the OTP lifecycle manager

use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::domain::entities::{OtpChallenge, OtpPurpose, User, MAX_ATTEMPTS};
use crate::domain::value_objects::{NextStep, VerifyOutcome};
use crate::errors::{DomainError, OtpError, ValidationError};
use crate::repositories::{InMemoryUserRepository, OtpChallengeRepository, UserRepository};
use crate::services::otp::{OtpService, OtpServiceConfig};
use crate::services::token::TokenIssuer;

use super::mocks::{
    harness, harness_with, test_config, token_issuer, wrong_code, AlwaysStaleStore, Harness,
    MockSmsSender, SmsBehavior, MOBILE,
};

fn otp_error(err: DomainError) -> OtpError {
    match err {
        DomainError::Otp(e) => e,
        other => panic!("Expected OTP error, got {:?}", other),
    }
}

async fn existing_user(users: &InMemoryUserRepository) -> User {
    let mut user = User::new_registered(MOBILE, "hash".to_string());
    user.is_verified = false;
    users.insert(user.clone()).await;
    user
}

#[tokio::test]
async fn test_request_challenge_stores_and_sends_code() {
    let h = harness();

    let issued = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Registration)
        .await
        .unwrap();

    assert_eq!(issued.mobile, MOBILE);
    assert_eq!(issued.purpose, OtpPurpose::Registration);
    assert_eq!(issued.expires_in, 600);

    let code = issued.code.unwrap();
    assert_eq!(code.len(), 6);
    assert_eq!(h.sms.last_code(MOBILE), Some(code.clone()));

    let stored = h
        .store
        .find_active(MOBILE, OtpPurpose::Registration)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.code, code);
    assert_eq!(stored.attempts, 0);
    assert_eq!(stored.max_attempts, MAX_ATTEMPTS);
}

#[tokio::test]
async fn test_code_hidden_unless_exposed() {
    let config = OtpServiceConfig {
        expose_code: false,
        ..test_config()
    };
    let h = harness_with(config, SmsBehavior::Deliver);

    let issued = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Login)
        .await
        .unwrap();

    assert!(issued.code.is_none());
    assert!(h.sms.last_code(MOBILE).is_some());
}

#[tokio::test]
async fn test_repeated_requests_leave_one_active_challenge() {
    let h = harness();

    let mut last_code = String::new();
    for _ in 0..3 {
        last_code = h
            .service
            .request_challenge(MOBILE, OtpPurpose::Login)
            .await
            .unwrap()
            .code
            .unwrap();
    }

    let all = h.store.all_for(MOBILE, OtpPurpose::Login).await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].code, last_code);
    assert_eq!(h.sms.sent_count(), 3);
}

#[tokio::test]
async fn test_mobile_is_normalized() {
    let h = harness();

    let issued = h
        .service
        .request_challenge("98765 43210", OtpPurpose::Login)
        .await
        .unwrap();
    assert_eq!(issued.mobile, MOBILE);

    let status = h
        .service
        .get_status("(987) 654-3210", OtpPurpose::Login)
        .await
        .unwrap();
    assert_eq!(status.mobile, MOBILE);
}

#[tokio::test]
async fn test_empty_mobile_rejected() {
    let h = harness();

    let err = h
        .service
        .request_challenge("+-()", OtpPurpose::Login)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::InvalidMobile { .. })
    ));
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn test_challenge_consumed_exactly_once() {
    let h = harness();
    let code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Registration)
        .await
        .unwrap()
        .code
        .unwrap();

    let outcome = h
        .service
        .verify_challenge(MOBILE, OtpPurpose::Registration, &code)
        .await
        .unwrap();
    match outcome {
        VerifyOutcome::RegistrationPending {
            mobile, next_step, ..
        } => {
            assert_eq!(mobile, MOBILE);
            assert_eq!(next_step, NextStep::CompleteRegistration);
        }
        other => panic!("Unexpected outcome: {:?}", other),
    }

    let err = h
        .service
        .verify_challenge(MOBILE, OtpPurpose::Registration, &code)
        .await
        .unwrap_err();
    assert_eq!(otp_error(err), OtpError::OtpExpired);
}

#[tokio::test]
async fn test_wrong_codes_count_down_then_destroy() {
    let h = harness();
    let code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Login)
        .await
        .unwrap()
        .code
        .unwrap();
    let wrong = wrong_code(&code);

    for expected in [4, 3, 2, 1] {
        let err = h
            .service
            .verify_challenge(MOBILE, OtpPurpose::Login, &wrong)
            .await
            .unwrap_err();
        assert_eq!(
            otp_error(err),
            OtpError::InvalidOtp {
                remaining_attempts: expected
            }
        );
    }

    let err = h
        .service
        .verify_challenge(MOBILE, OtpPurpose::Login, &wrong)
        .await
        .unwrap_err();
    assert_eq!(otp_error(err), OtpError::MaxAttemptsExceeded);
    assert!(h.store.all_for(MOBILE, OtpPurpose::Login).await.is_empty());

    // Even the right code is useless now
    let err = h
        .service
        .verify_challenge(MOBILE, OtpPurpose::Login, &code)
        .await
        .unwrap_err();
    assert_eq!(otp_error(err), OtpError::OtpExpired);
}

#[tokio::test]
async fn test_capped_challenge_in_store_is_destroyed() {
    let h = harness();
    let mut capped = OtpChallenge::with_code(
        MOBILE.to_string(),
        OtpPurpose::Login,
        "123456".to_string(),
        Duration::minutes(10),
        MAX_ATTEMPTS,
    );
    capped.attempts = MAX_ATTEMPTS;
    h.store.create(&capped).await.unwrap();

    let err = h
        .service
        .verify_challenge(MOBILE, OtpPurpose::Login, "123456")
        .await
        .unwrap_err();

    assert_eq!(otp_error(err), OtpError::MaxAttemptsExceeded);
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn test_failed_attempt_is_persisted() {
    let h = harness();
    let code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Login)
        .await
        .unwrap()
        .code
        .unwrap();

    let _ = h
        .service
        .verify_challenge(MOBILE, OtpPurpose::Login, &wrong_code(&code))
        .await;

    let stored = h
        .store
        .find_active(MOBILE, OtpPurpose::Login)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.attempts, 1);
    assert_eq!(stored.version, 1);
    assert!(!stored.is_used);
}

#[tokio::test]
async fn test_resend_within_cooldown_is_rate_limited() {
    let h = harness();
    h.service
        .request_challenge(MOBILE, OtpPurpose::Login)
        .await
        .unwrap();

    let err = h
        .service
        .resend_challenge(MOBILE, OtpPurpose::Login)
        .await
        .unwrap_err();

    match otp_error(err) {
        OtpError::RateLimited { retry_after } => assert!((1..=30).contains(&retry_after)),
        other => panic!("Expected RATE_LIMITED, got {:?}", other),
    }
    assert_eq!(h.sms.sent_count(), 1);
}

#[tokio::test]
async fn test_double_resend_is_rate_limited() {
    let h = harness();

    h.service
        .resend_challenge(MOBILE, OtpPurpose::PasswordReset)
        .await
        .unwrap();
    let err = h
        .service
        .resend_challenge(MOBILE, OtpPurpose::PasswordReset)
        .await
        .unwrap_err();

    assert!(matches!(otp_error(err), OtpError::RateLimited { .. }));
}

#[tokio::test]
async fn test_resend_after_cooldown_regenerates() {
    let h = harness();
    let first = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Login)
        .await
        .unwrap()
        .code
        .unwrap();

    let mut aged = h
        .store
        .find_active(MOBILE, OtpPurpose::Login)
        .await
        .unwrap()
        .unwrap();
    aged.created_at = Utc::now() - Duration::seconds(31);
    h.store.replace(&aged).await.unwrap();

    let issued = h
        .service
        .resend_challenge(MOBILE, OtpPurpose::Login)
        .await
        .unwrap();

    let all = h.store.all_for(MOBILE, OtpPurpose::Login).await;
    assert_eq!(all.len(), 1);
    assert_ne!(all[0].id, aged.id);
    assert_eq!(issued.code.as_deref(), Some(all[0].code.as_str()));
    assert_eq!(h.sms.sent_count(), 2);
    // The old code no longer verifies unless the draw repeated it
    if issued.code.as_deref() != Some(first.as_str()) {
        assert!(h
            .service
            .validate_without_consuming(MOBILE, OtpPurpose::Login, &first)
            .await
            .is_err());
    }
}

#[tokio::test]
async fn test_resend_with_no_current_challenge_issues_one() {
    let h = harness();
    let issued = h
        .service
        .resend_challenge(MOBILE, OtpPurpose::AccountVerification)
        .await
        .unwrap();
    assert!(issued.code.is_some());
}

#[tokio::test]
async fn test_expired_challenge_cannot_be_verified() {
    let config = OtpServiceConfig {
        code_ttl: Duration::milliseconds(1),
        ..test_config()
    };
    let h = harness_with(config, SmsBehavior::Deliver);

    let code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Login)
        .await
        .unwrap()
        .code
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let err = h
        .service
        .verify_challenge(MOBILE, OtpPurpose::Login, &code)
        .await
        .unwrap_err();
    assert_eq!(otp_error(err), OtpError::OtpExpired);

    let err = h
        .service
        .get_status(MOBILE, OtpPurpose::Login)
        .await
        .unwrap_err();
    assert_eq!(otp_error(err), OtpError::NoActiveOtp);
}

#[tokio::test]
async fn test_registration_conflict_when_user_exists() {
    let h = harness();
    existing_user(&h.users).await;
    let code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Registration)
        .await
        .unwrap()
        .code
        .unwrap();

    let err = h
        .service
        .verify_challenge(MOBILE, OtpPurpose::Registration, &code)
        .await
        .unwrap_err();
    assert_eq!(otp_error(err), OtpError::UserAlreadyExists);

    // The challenge was consumed before the conflict check
    let current = h
        .store
        .find_current(MOBILE, OtpPurpose::Registration)
        .await
        .unwrap()
        .unwrap();
    assert!(current.is_used);
}

#[tokio::test]
async fn test_login_without_user_is_not_found() {
    let h = harness();
    let code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Login)
        .await
        .unwrap()
        .code
        .unwrap();

    let err = h
        .service
        .verify_challenge(MOBILE, OtpPurpose::Login, &code)
        .await
        .unwrap_err();
    assert_eq!(otp_error(err), OtpError::UserNotFound);
}

#[tokio::test]
async fn test_login_issues_token_for_user() {
    let h = harness();
    let user = existing_user(&h.users).await;
    let code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Login)
        .await
        .unwrap()
        .code
        .unwrap();

    let outcome = h
        .service
        .verify_challenge(MOBILE, OtpPurpose::Login, &code)
        .await
        .unwrap();

    match outcome {
        VerifyOutcome::LoggedIn {
            token,
            user: profile,
            next_step,
        } => {
            assert_eq!(next_step, NextStep::Dashboard);
            assert_eq!(profile.id, user.id);
            let claims = h.tokens.verify(&token).unwrap();
            assert_eq!(claims.user_id(), Some(user.id));
        }
        other => panic!("Unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_login_matches_country_prefixed_phone() {
    let h = harness();
    let mut user = User::new_registered(MOBILE, "hash".to_string());
    user.phone = format!("+91{}", MOBILE);
    h.users.insert(user.clone()).await;

    let code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Login)
        .await
        .unwrap()
        .code
        .unwrap();
    let outcome = h
        .service
        .verify_challenge(MOBILE, OtpPurpose::Login, &code)
        .await
        .unwrap();

    assert!(matches!(outcome, VerifyOutcome::LoggedIn { .. }));
}

#[tokio::test]
async fn test_password_reset_branch() {
    let h = harness();
    let first_code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::PasswordReset)
        .await
        .unwrap()
        .code
        .unwrap();
    let err = h
        .service
        .verify_challenge(MOBILE, OtpPurpose::PasswordReset, &first_code)
        .await
        .unwrap_err();
    assert_eq!(otp_error(err), OtpError::UserNotFound);

    let user = existing_user(&h.users).await;
    let code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::PasswordReset)
        .await
        .unwrap()
        .code
        .unwrap();
    let outcome = h
        .service
        .verify_challenge(MOBILE, OtpPurpose::PasswordReset, &code)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        VerifyOutcome::PasswordResetAllowed {
            user_id: user.id,
            next_step: NextStep::ResetPassword,
        }
    );
}

#[tokio::test]
async fn test_account_verification_sets_flag() {
    let h = harness();
    let user = existing_user(&h.users).await;
    let code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::AccountVerification)
        .await
        .unwrap()
        .code
        .unwrap();

    let outcome = h
        .service
        .verify_challenge(MOBILE, OtpPurpose::AccountVerification, &code)
        .await
        .unwrap();

    assert_eq!(outcome.next_step(), NextStep::AccountVerified);
    assert!(h.users.find_by_id(user.id).await.unwrap().unwrap().is_verified);
}

#[tokio::test]
async fn test_purposes_are_independent() {
    let h = harness();
    let login_code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Login)
        .await
        .unwrap()
        .code
        .unwrap();

    let err = h
        .service
        .verify_challenge(MOBILE, OtpPurpose::PasswordReset, &login_code)
        .await
        .unwrap_err();
    assert_eq!(otp_error(err), OtpError::OtpExpired);
}

#[tokio::test]
async fn test_validate_never_mutates() {
    let h = harness();
    let code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Login)
        .await
        .unwrap()
        .code
        .unwrap();
    let wrong = wrong_code(&code);

    for _ in 0..(MAX_ATTEMPTS + 2) {
        let err = h
            .service
            .validate_without_consuming(MOBILE, OtpPurpose::Login, &wrong)
            .await
            .unwrap_err();
        assert_eq!(
            otp_error(err),
            OtpError::InvalidOtp {
                remaining_attempts: MAX_ATTEMPTS
            }
        );
    }

    let outcome = h
        .service
        .validate_without_consuming(MOBILE, OtpPurpose::Login, &code)
        .await
        .unwrap();
    assert!(outcome.valid);

    let stored = h
        .store
        .find_active(MOBILE, OtpPurpose::Login)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.attempts, 0);
    assert_eq!(stored.version, 0);
    assert!(!stored.is_used);
}

#[tokio::test]
async fn test_validate_reports_cap_without_deleting() {
    let h = harness();
    let mut capped = OtpChallenge::with_code(
        MOBILE.to_string(),
        OtpPurpose::Login,
        "123456".to_string(),
        Duration::minutes(10),
        MAX_ATTEMPTS,
    );
    capped.attempts = MAX_ATTEMPTS;
    h.store.create(&capped).await.unwrap();

    let err = h
        .service
        .validate_without_consuming(MOBILE, OtpPurpose::Login, "123456")
        .await
        .unwrap_err();

    assert_eq!(otp_error(err), OtpError::MaxAttemptsExceeded);
    assert_eq!(h.store.len().await, 1);
}

#[tokio::test]
async fn test_validate_without_challenge_is_expired() {
    let h = harness();
    let err = h
        .service
        .validate_without_consuming(MOBILE, OtpPurpose::Login, "123456")
        .await
        .unwrap_err();
    assert_eq!(otp_error(err), OtpError::OtpExpired);
}

#[tokio::test]
async fn test_status_reports_challenge_without_code() {
    let h = harness();

    let err = h
        .service
        .get_status(MOBILE, OtpPurpose::Login)
        .await
        .unwrap_err();
    assert_eq!(otp_error(err), OtpError::NoActiveOtp);

    let code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Login)
        .await
        .unwrap()
        .code
        .unwrap();
    let _ = h
        .service
        .verify_challenge(MOBILE, OtpPurpose::Login, &wrong_code(&code))
        .await;

    let status = h
        .service
        .get_status(MOBILE, OtpPurpose::Login)
        .await
        .unwrap();

    assert!(status.expires_in > 590 && status.expires_in <= 600);
    assert!(!status.can_resend);
    assert_eq!(status.attempts, 1);
    assert_eq!(status.max_attempts, MAX_ATTEMPTS);
    assert_eq!(status.remaining_attempts, MAX_ATTEMPTS - 1);
    assert!(!status.is_used);
    assert!(!status.verified);
    assert_eq!(
        status.expires_at - status.created_at,
        Duration::seconds(600)
    );
    assert!(!format!("{:?}", status).contains("code"));
}

#[tokio::test]
async fn test_status_includes_consumed_challenge() {
    let h = harness();
    let code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Registration)
        .await
        .unwrap()
        .code
        .unwrap();
    h.service
        .verify_challenge(MOBILE, OtpPurpose::Registration, &code)
        .await
        .unwrap();

    let status = h
        .service
        .get_status(MOBILE, OtpPurpose::Registration)
        .await
        .unwrap();
    assert!(status.is_used);
    assert!(status.verified);
}

#[tokio::test]
async fn test_sms_failure_is_not_fatal() {
    let h = harness_with(test_config(), SmsBehavior::Fail);

    let code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Registration)
        .await
        .unwrap()
        .code
        .unwrap();

    assert_eq!(h.sms.sent_count(), 0);
    assert!(h
        .service
        .verify_challenge(MOBILE, OtpPurpose::Registration, &code)
        .await
        .is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_sms_timeout_is_not_fatal() {
    let h = harness_with(
        test_config(),
        SmsBehavior::Hang(std::time::Duration::from_secs(60)),
    );

    let code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Registration)
        .await
        .unwrap()
        .code
        .unwrap();

    assert_eq!(h.sms.sent_count(), 0);
    assert!(h
        .service
        .validate_without_consuming(MOBILE, OtpPurpose::Registration, &code)
        .await
        .unwrap()
        .valid);
}

#[tokio::test]
async fn test_stale_writes_give_up_after_retries() {
    let store = Arc::new(AlwaysStaleStore::default());
    let service = OtpService::new(
        store.clone(),
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(MockSmsSender::new(SmsBehavior::Deliver)),
        Arc::new(token_issuer()),
        test_config(),
    );

    let code = service
        .request_challenge(MOBILE, OtpPurpose::Registration)
        .await
        .unwrap()
        .code
        .unwrap();

    let err = service
        .verify_challenge(MOBILE, OtpPurpose::Registration, &code)
        .await
        .unwrap_err();
    assert_eq!(otp_error(err), OtpError::ConcurrentModification);

    let stored = store
        .inner
        .find_active(MOBILE, OtpPurpose::Registration)
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.is_used);
}

#[tokio::test]
async fn test_registration_scenario() {
    let h = harness();

    let issued = h
        .service
        .request_challenge("9876543210", OtpPurpose::Registration)
        .await
        .unwrap();
    assert_eq!(issued.expires_in, 600);
    let code = issued.code.unwrap();

    let outcome = h
        .service
        .verify_challenge("9876543210", OtpPurpose::Registration, &code)
        .await
        .unwrap();
    assert_eq!(outcome.next_step(), NextStep::CompleteRegistration);

    let completed = h
        .service
        .complete_registration("9876543210", "secret123")
        .await
        .unwrap();

    assert_eq!(completed.user.phone, "9876543210");
    assert_eq!(completed.user.first_name, "User");
    assert_eq!(completed.user.last_name, "3210");
    assert_eq!(completed.user.email, "user_9876543210@palmpay.com");
    assert!(completed.user.is_verified);
    assert_eq!(
        h.tokens.verify(&completed.token).unwrap().user_id(),
        Some(completed.user.id)
    );

    let stored = h.users.find_by_phone("9876543210").await.unwrap().unwrap();
    assert!(stored.password_hash.starts_with("$2"));
    assert_ne!(stored.password_hash, "secret123");

    assert!(h
        .store
        .all_for("9876543210", OtpPurpose::Registration)
        .await
        .is_empty());
    let err = h
        .service
        .get_status("9876543210", OtpPurpose::Registration)
        .await
        .unwrap_err();
    assert_eq!(otp_error(err), OtpError::NoActiveOtp);
}

#[tokio::test]
async fn test_complete_registration_requires_verification() {
    let h = harness();

    let err = h
        .service
        .complete_registration(MOBILE, "secret123")
        .await
        .unwrap_err();
    assert_eq!(otp_error(err), OtpError::VerificationRequired);

    // An unconsumed challenge is not enough
    h.service
        .request_challenge(MOBILE, OtpPurpose::Registration)
        .await
        .unwrap();
    let err = h
        .service
        .complete_registration(MOBILE, "secret123")
        .await
        .unwrap_err();
    assert_eq!(otp_error(err), OtpError::VerificationRequired);
    assert_eq!(h.users.len().await, 0);
}

#[tokio::test]
async fn test_complete_registration_rejects_short_password() {
    let h = harness();
    let err = h
        .service
        .complete_registration(MOBILE, "12345")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::PasswordTooShort { min_length: 6 })
    ));
}

#[tokio::test]
async fn test_complete_registration_rejects_existing_user() {
    let h = harness();
    let code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Registration)
        .await
        .unwrap()
        .code
        .unwrap();
    h.service
        .verify_challenge(MOBILE, OtpPurpose::Registration, &code)
        .await
        .unwrap();

    existing_user(&h.users).await;

    let err = h
        .service
        .complete_registration(MOBILE, "secret123")
        .await
        .unwrap_err();
    assert_eq!(otp_error(err), OtpError::UserAlreadyExists);
    assert_eq!(h.users.len().await, 1);
}

/// Register MOBILE through the OTP flow with `password`
async fn registered_user(h: &Harness, password: &str) -> User {
    let code = h
        .service
        .request_challenge(MOBILE, OtpPurpose::Registration)
        .await
        .unwrap()
        .code
        .unwrap();
    h.service
        .verify_challenge(MOBILE, OtpPurpose::Registration, &code)
        .await
        .unwrap();
    h.service
        .complete_registration(MOBILE, password)
        .await
        .unwrap();
    h.users.find_by_phone(MOBILE).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_password_login_issues_token() {
    let h = harness();
    let user = registered_user(&h, "secret123").await;

    let login = h
        .service
        .login_with_password("98765-43210", "secret123")
        .await
        .unwrap();

    assert_eq!(login.user.id, user.id);
    assert_eq!(
        h.tokens.verify(&login.token).unwrap().user_id(),
        Some(user.id)
    );
}

#[tokio::test]
async fn test_password_login_rejects_wrong_password_and_unknown_mobile() {
    let h = harness();
    registered_user(&h, "secret123").await;

    let err = h
        .service
        .login_with_password(MOBILE, "secret124")
        .await
        .unwrap_err();
    assert_eq!(otp_error(err), OtpError::InvalidCredentials);

    let err = h
        .service
        .login_with_password("9123456780", "secret123")
        .await
        .unwrap_err();
    assert_eq!(otp_error(err), OtpError::InvalidCredentials);
}

#[tokio::test]
async fn test_authenticate_resolves_token_to_user() {
    let h = harness();
    let user = registered_user(&h, "secret123").await;
    let login = h
        .service
        .login_with_password(MOBILE, "secret123")
        .await
        .unwrap();

    let profile = h.service.authenticate(&login.token).await.unwrap();
    assert_eq!(profile.id, user.id);
    assert_eq!(profile.phone, MOBILE);
}

#[tokio::test]
async fn test_authenticate_rejects_forged_and_orphaned_tokens() {
    let h = harness();

    let err = h.service.authenticate("not-a-jwt").await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::InvalidToken)
    ));

    // Genuine signature, but no such account
    let orphan = h.tokens.issue(uuid::Uuid::new_v4()).unwrap();
    let err = h.service.authenticate(&orphan).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::InvalidToken)
    ));
}
