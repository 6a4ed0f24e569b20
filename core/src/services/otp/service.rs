//! OTP lifecycle manager

use chrono::Utc;
use pp_shared::phone::{mask_phone_number, normalize_mobile};
use std::sync::Arc;

use crate::domain::entities::{OtpChallenge, OtpPurpose, User, UserProfile};
use crate::domain::value_objects::{
    ChallengeIssued, LoginCompleted, NextStep, RegistrationCompleted, StatusSnapshot, ValidationOutcome,
    VerifyOutcome,
};
use crate::errors::{DomainResult, OtpError, ValidationError};
use crate::repositories::{OtpChallengeRepository, SaveOutcome, UserRepository};
use crate::services::password::{PasswordHasher, MIN_PASSWORD_LENGTH};
use crate::services::token::TokenIssuer;

use super::config::OtpServiceConfig;
use super::keyed_locks::KeyedLocks;
use super::traits::SmsSender;

/// Issues, verifies and consumes purpose-scoped OTP challenges
///
/// Every mutating operation on a (mobile, purpose) key runs under a per-key
/// lock, and every challenge write is a compare-and-swap on its version so
/// that processes sharing a store still count each guess exactly once.
pub struct OtpService<S, U, M, T>
where
    S: OtpChallengeRepository,
    U: UserRepository,
    M: SmsSender,
    T: TokenIssuer,
{
    challenges: Arc<S>,
    users: Arc<U>,
    sms_sender: Arc<M>,
    token_issuer: Arc<T>,
    password_hasher: PasswordHasher,
    config: OtpServiceConfig,
    locks: KeyedLocks,
}

impl<S, U, M, T> OtpService<S, U, M, T>
where
    S: OtpChallengeRepository,
    U: UserRepository,
    M: SmsSender,
    T: TokenIssuer,
{
    /// Create a new OTP service
    ///
    /// # Arguments
    ///
    /// * `challenges` - OTP challenge store
    /// * `users` - User store consulted by the purpose branch
    /// * `sms_sender` - SMS delivery implementation
    /// * `token_issuer` - Issues bearer tokens on login and registration
    /// * `config` - Lifecycle policy
    pub fn new(
        challenges: Arc<S>,
        users: Arc<U>,
        sms_sender: Arc<M>,
        token_issuer: Arc<T>,
        config: OtpServiceConfig,
    ) -> Self {
        Self {
            challenges,
            users,
            sms_sender,
            token_issuer,
            password_hasher: PasswordHasher::default(),
            config,
            locks: KeyedLocks::new(),
        }
    }

    /// Replace the password hasher, e.g. with a cheaper bcrypt cost in tests
    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self
    }

    pub fn config(&self) -> &OtpServiceConfig {
        &self.config
    }

    /// Issue a fresh challenge, superseding any existing one for the key
    ///
    /// SMS delivery failures are logged and never fail the request; the
    /// challenge stays valid.
    pub async fn request_challenge(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
    ) -> DomainResult<ChallengeIssued> {
        let mobile = Self::normalize(mobile)?;

        let challenge = {
            let _guard = self.locks.lock(Self::lock_key(&mobile, purpose)).await;
            self.store_new_challenge(&mobile, purpose).await?
        };

        self.dispatch_sms(&challenge).await;
        Ok(self.issued(challenge))
    }

    /// Issue a fresh challenge unless the current one is younger than the cooldown
    ///
    /// # Returns
    ///
    /// * `Ok(ChallengeIssued)` - A new challenge replaced the old one
    /// * `Err(OtpError::RateLimited)` - `retry_after` seconds remain, always `1..=cooldown`
    pub async fn resend_challenge(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
    ) -> DomainResult<ChallengeIssued> {
        let mobile = Self::normalize(mobile)?;

        let challenge = {
            let _guard = self.locks.lock(Self::lock_key(&mobile, purpose)).await;

            if let Some(current) = self.challenges.find_current(&mobile, purpose).await? {
                if let Some(retry_after) =
                    current.resend_wait_at(Utc::now(), self.config.resend_cooldown)
                {
                    tracing::warn!(
                        mobile = %mask_phone_number(&mobile),
                        purpose = %purpose,
                        retry_after = retry_after,
                        event = "otp_resend_rate_limited",
                        "OTP resend requested before cooldown elapsed"
                    );
                    return Err(OtpError::RateLimited { retry_after }.into());
                }
            }

            self.store_new_challenge(&mobile, purpose).await?
        };

        self.dispatch_sms(&challenge).await;
        Ok(self.issued(challenge))
    }

    /// Check a submitted code and consume the challenge on a match
    ///
    /// Wrong codes count against the attempt budget; the guess that exhausts
    /// it destroys the challenge. A match is then routed through the
    /// purpose-specific branch.
    pub async fn verify_challenge(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
        submitted: &str,
    ) -> DomainResult<VerifyOutcome> {
        let mobile = Self::normalize(mobile)?;
        let _guard = self.locks.lock(Self::lock_key(&mobile, purpose)).await;

        for attempt in 1..=self.config.max_cas_retries.max(1) {
            if let Some(challenge) = self.try_consume(&mobile, purpose, submitted).await? {
                tracing::info!(
                    mobile = %mask_phone_number(&mobile),
                    purpose = %purpose,
                    challenge_id = %challenge.id,
                    event = "otp_verified",
                    "OTP verified and consumed"
                );
                return self.complete_purpose(challenge).await;
            }

            tracing::debug!(
                mobile = %mask_phone_number(&mobile),
                purpose = %purpose,
                attempt = attempt,
                event = "otp_cas_conflict",
                "Challenge changed during verification, re-reading"
            );
        }

        tracing::warn!(
            mobile = %mask_phone_number(&mobile),
            purpose = %purpose,
            event = "otp_concurrent_modification",
            "Gave up verifying after repeated concurrent modifications"
        );
        Err(OtpError::ConcurrentModification.into())
    }

    /// Describe the current challenge without revealing its code
    ///
    /// Considers any unexpired challenge, consumed or not.
    pub async fn get_status(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
    ) -> DomainResult<StatusSnapshot> {
        let mobile = Self::normalize(mobile)?;
        let challenge = self
            .challenges
            .find_current(&mobile, purpose)
            .await?
            .ok_or(OtpError::NoActiveOtp)?;

        let now = Utc::now();
        Ok(StatusSnapshot {
            expires_in: challenge.expires_in_at(now),
            can_resend: challenge
                .resend_wait_at(now, self.config.resend_cooldown)
                .is_none(),
            attempts: challenge.attempts,
            max_attempts: challenge.max_attempts,
            remaining_attempts: challenge.remaining_attempts(),
            is_used: challenge.is_used,
            verified: challenge.verified,
            created_at: challenge.created_at,
            expires_at: challenge.expires_at,
            mobile,
            purpose,
        })
    }

    /// Check a code without consuming the challenge or counting the guess
    pub async fn validate_without_consuming(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
        submitted: &str,
    ) -> DomainResult<ValidationOutcome> {
        let mobile = Self::normalize(mobile)?;
        let challenge = self
            .challenges
            .find_active(&mobile, purpose)
            .await?
            .ok_or(OtpError::OtpExpired)?;

        if challenge.has_reached_max_attempts() {
            return Err(OtpError::MaxAttemptsExceeded.into());
        }

        if !challenge.matches(submitted) {
            return Err(OtpError::InvalidOtp {
                remaining_attempts: challenge.remaining_attempts(),
            }
            .into());
        }

        Ok(ValidationOutcome { valid: true })
    }

    /// Turn a verified registration challenge into an account
    ///
    /// # Returns
    ///
    /// * `Ok(RegistrationCompleted)` - Account created and token issued
    /// * `Err(OtpError::VerificationRequired)` - No verified, unexpired registration challenge
    /// * `Err(OtpError::UserAlreadyExists)` - The mobile already has an account
    pub async fn complete_registration(
        &self,
        mobile: &str,
        password: &str,
    ) -> DomainResult<RegistrationCompleted> {
        let mobile = Self::normalize(mobile)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort {
                min_length: MIN_PASSWORD_LENGTH,
            }
            .into());
        }

        let purpose = OtpPurpose::Registration;
        let _guard = self.locks.lock(Self::lock_key(&mobile, purpose)).await;

        let verified = self
            .challenges
            .find_current(&mobile, purpose)
            .await?
            .is_some_and(|c| c.verified && c.is_used);
        if !verified {
            return Err(OtpError::VerificationRequired.into());
        }

        if self.users.find_by_phone(&mobile).await?.is_some() {
            return Err(OtpError::UserAlreadyExists.into());
        }

        let password_hash = self.password_hasher.hash(password).await?;
        let user = self
            .users
            .create(User::new_registered(&mobile, password_hash))
            .await?;
        let token = self.token_issuer.issue(user.id)?;
        self.challenges.delete_all(&mobile, purpose).await?;

        tracing::info!(
            mobile = %mask_phone_number(&mobile),
            user_id = %user.id,
            event = "registration_completed",
            "Registration completed"
        );

        Ok(RegistrationCompleted {
            token,
            user: user.profile(),
        })
    }

    /// Sign in a registered user with mobile and password
    ///
    /// An unknown mobile and a wrong password fail the same way so the
    /// response does not reveal which accounts exist.
    pub async fn login_with_password(
        &self,
        mobile: &str,
        password: &str,
    ) -> DomainResult<LoginCompleted> {
        let mobile = Self::normalize(mobile)?;

        let Some(user) = self.users.find_by_phone(&mobile).await? else {
            tracing::warn!(
                mobile = %mask_phone_number(&mobile),
                event = "password_login_failed",
                reason = "unknown_mobile",
                "Password login rejected"
            );
            return Err(OtpError::InvalidCredentials.into());
        };

        if !self
            .password_hasher
            .verify(password, &user.password_hash)
            .await?
        {
            tracing::warn!(
                mobile = %mask_phone_number(&mobile),
                user_id = %user.id,
                event = "password_login_failed",
                reason = "wrong_password",
                "Password login rejected"
            );
            return Err(OtpError::InvalidCredentials.into());
        }

        let token = self.token_issuer.issue(user.id)?;
        tracing::info!(
            mobile = %mask_phone_number(&mobile),
            user_id = %user.id,
            event = "password_login",
            "User signed in with password"
        );

        Ok(LoginCompleted {
            token,
            user: user.profile(),
        })
    }

    /// Resolve a bearer token to the account it was issued for
    pub async fn authenticate(&self, token: &str) -> DomainResult<UserProfile> {
        let claims = self.token_issuer.verify(token)?;
        let user_id = claims.user_id().ok_or(ValidationError::InvalidToken)?;

        match self.users.find_by_id(user_id).await? {
            Some(user) => Ok(user.profile()),
            None => {
                tracing::debug!(user_id = %user_id, "Token subject no longer exists");
                Err(ValidationError::InvalidToken.into())
            }
        }
    }

    /// One pass of the verification state machine
    ///
    /// Returns `Ok(None)` when the compare-and-swap lost a race and the caller
    /// should re-read.
    async fn try_consume(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
        submitted: &str,
    ) -> DomainResult<Option<OtpChallenge>> {
        let challenge = self
            .challenges
            .find_active(mobile, purpose)
            .await?
            .ok_or(OtpError::OtpExpired)?;

        if challenge.has_reached_max_attempts() {
            self.challenges.delete(&challenge).await?;
            return Err(OtpError::MaxAttemptsExceeded.into());
        }

        if !challenge.matches(submitted) {
            let mut updated = challenge;
            let remaining_attempts = updated.record_failed_attempt();

            if self.challenges.save(&updated).await? == SaveOutcome::Stale {
                return Ok(None);
            }

            tracing::warn!(
                mobile = %mask_phone_number(mobile),
                purpose = %purpose,
                attempts = updated.attempts,
                remaining_attempts = remaining_attempts,
                event = "otp_verification_failed",
                "Invalid OTP submitted"
            );

            // Only the capped challenge goes; a newer one issued meanwhile stays
            if remaining_attempts == 0 {
                self.challenges.delete(&updated).await?;
                tracing::warn!(
                    mobile = %mask_phone_number(mobile),
                    purpose = %purpose,
                    event = "otp_max_attempts_exceeded",
                    "OTP destroyed after too many failed attempts"
                );
                return Err(OtpError::MaxAttemptsExceeded.into());
            }

            return Err(OtpError::InvalidOtp { remaining_attempts }.into());
        }

        let mut consumed = challenge;
        consumed.mark_verified();
        match self.challenges.save(&consumed).await? {
            SaveOutcome::Saved => Ok(Some(consumed)),
            SaveOutcome::Stale => Ok(None),
        }
    }

    /// Purpose-specific follow-up after a successful verification
    async fn complete_purpose(&self, challenge: OtpChallenge) -> DomainResult<VerifyOutcome> {
        let user = self.users.find_by_phone(&challenge.mobile).await?;

        match challenge.purpose {
            OtpPurpose::Registration => {
                if user.is_some() {
                    return Err(OtpError::UserAlreadyExists.into());
                }
                Ok(VerifyOutcome::RegistrationPending {
                    mobile: challenge.mobile,
                    challenge_id: challenge.id,
                    next_step: NextStep::CompleteRegistration,
                })
            }
            OtpPurpose::Login => {
                let user = user.ok_or(OtpError::UserNotFound)?;
                let token = self.token_issuer.issue(user.id)?;
                tracing::info!(user_id = %user.id, event = "login_succeeded", "User logged in with OTP");
                Ok(VerifyOutcome::LoggedIn {
                    token,
                    user: user.profile(),
                    next_step: NextStep::Dashboard,
                })
            }
            OtpPurpose::PasswordReset => {
                let user = user.ok_or(OtpError::UserNotFound)?;
                Ok(VerifyOutcome::PasswordResetAllowed {
                    user_id: user.id,
                    next_step: NextStep::ResetPassword,
                })
            }
            OtpPurpose::AccountVerification => {
                let user = user.ok_or(OtpError::UserNotFound)?;
                self.users.set_verified(user.id).await?;
                Ok(VerifyOutcome::AccountVerified {
                    user_id: user.id,
                    next_step: NextStep::AccountVerified,
                })
            }
        }
    }

    /// Generate a challenge and atomically replace whatever the key held
    async fn store_new_challenge(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
    ) -> DomainResult<OtpChallenge> {
        let challenge = OtpChallenge::new(
            mobile.to_string(),
            purpose,
            self.config.code_ttl,
            self.config.max_attempts,
        );

        self.challenges.replace(&challenge).await.map_err(|e| {
            tracing::error!(
                mobile = %mask_phone_number(mobile),
                purpose = %purpose,
                error = %e,
                event = "otp_storage_failed",
                "Failed to store OTP challenge"
            );
            e
        })?;

        tracing::info!(
            mobile = %mask_phone_number(mobile),
            purpose = %purpose,
            challenge_id = %challenge.id,
            event = "otp_generated",
            "Generated new OTP challenge"
        );
        if self.config.expose_code {
            tracing::debug!(
                mobile = %mask_phone_number(mobile),
                purpose = %purpose,
                code = %challenge.code,
                "Development OTP"
            );
        }

        Ok(challenge)
    }

    /// Hand the code to the SMS channel, bounded by the configured timeout
    async fn dispatch_sms(&self, challenge: &OtpChallenge) {
        let masked = mask_phone_number(&challenge.mobile);
        let send = self
            .sms_sender
            .send_otp(&challenge.mobile, &challenge.code, challenge.purpose);

        match tokio::time::timeout(self.config.sms_timeout, send).await {
            Ok(Ok(message_id)) => tracing::info!(
                mobile = %masked,
                purpose = %challenge.purpose,
                message_id = %message_id,
                event = "otp_sms_sent",
                "OTP SMS dispatched"
            ),
            Ok(Err(e)) => tracing::warn!(
                mobile = %masked,
                purpose = %challenge.purpose,
                error = %e,
                event = "otp_sms_failed",
                "OTP SMS delivery failed; challenge remains valid"
            ),
            Err(_) => tracing::warn!(
                mobile = %masked,
                purpose = %challenge.purpose,
                timeout_ms = self.config.sms_timeout.as_millis() as u64,
                event = "otp_sms_timeout",
                "OTP SMS delivery timed out; challenge remains valid"
            ),
        }
    }

    fn issued(&self, challenge: OtpChallenge) -> ChallengeIssued {
        ChallengeIssued {
            code: self.config.expose_code.then_some(challenge.code),
            mobile: challenge.mobile,
            purpose: challenge.purpose,
            expires_in: self.config.ttl_seconds(),
        }
    }

    fn normalize(mobile: &str) -> DomainResult<String> {
        let normalized = normalize_mobile(mobile);
        if normalized.is_empty() {
            return Err(ValidationError::InvalidMobile {
                mobile: mobile.to_string(),
            }
            .into());
        }
        Ok(normalized)
    }

    fn lock_key(mobile: &str, purpose: OtpPurpose) -> String {
        format!("{}:{}", purpose.as_str(), mobile)
    }
}
