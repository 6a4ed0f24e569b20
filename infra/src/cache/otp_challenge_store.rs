//! Redis-backed OTP challenge store
//!
//! One JSON document per (purpose, mobile) key under
//! `<prefix>:challenge:<purpose>:<mobile>`, written with a millisecond TTL
//! equal to the challenge's remaining lifetime. Redis drops the key at expiry;
//! reads additionally filter on `expires_at` so clock skew between Redis and
//! the process never resurrects an expired challenge.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use redis::Script;
use tracing::debug;

use pp_core::domain::entities::{OtpChallenge, OtpPurpose};
use pp_core::errors::DomainError;
use pp_core::repositories::{OtpChallengeRepository, SaveOutcome};
use pp_shared::phone::mask_phone_number;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

/// Overwrite the document only if it still holds the expected id and version
static COMPARE_AND_SWAP: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        local current = redis.call('GET', KEYS[1])
        if not current then
            return 0
        end
        local stored = cjson.decode(current)
        if stored['id'] ~= ARGV[1] or tonumber(stored['version']) ~= tonumber(ARGV[2]) then
            return 0
        end
        redis.call('SET', KEYS[1], ARGV[3], 'KEEPTTL')
        return 1
        "#,
    )
});

/// Delete the document only if it still holds the expected id
static DELETE_IF_ID: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        local current = redis.call('GET', KEYS[1])
        if not current then
            return 0
        end
        if cjson.decode(current)['id'] ~= ARGV[1] then
            return 0
        end
        return redis.call('DEL', KEYS[1])
        "#,
    )
});

/// Redis implementation of the challenge store
#[derive(Clone)]
pub struct RedisOtpChallengeRepository {
    client: RedisClient,
}

impl RedisOtpChallengeRepository {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn key(&self, mobile: &str, purpose: OtpPurpose) -> String {
        self.client.config().make_key(&challenge_key(mobile, purpose))
    }

    async fn load(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpChallenge>, InfrastructureError> {
        let Some(raw) = self.client.get(&self.key(mobile, purpose)).await? else {
            return Ok(None);
        };

        let challenge: OtpChallenge = serde_json::from_str(&raw)?;
        Ok((!challenge.is_expired_at(Utc::now())).then_some(challenge))
    }

    async fn write(&self, challenge: &OtpChallenge) -> Result<(), InfrastructureError> {
        let payload = serde_json::to_string(challenge)?;
        self.client
            .set_with_expiry_ms(
                &self.key(&challenge.mobile, challenge.purpose),
                &payload,
                ttl_millis(challenge, Utc::now()),
            )
            .await
    }
}

#[async_trait]
impl OtpChallengeRepository for RedisOtpChallengeRepository {
    async fn find_active(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpChallenge>, DomainError> {
        Ok(self
            .load(mobile, purpose)
            .await?
            .filter(|challenge| !challenge.is_used))
    }

    async fn find_current(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpChallenge>, DomainError> {
        Ok(self.load(mobile, purpose).await?)
    }

    /// Keys hold a single challenge, so creating one supersedes the previous
    async fn create(&self, challenge: &OtpChallenge) -> Result<(), DomainError> {
        Ok(self.write(challenge).await?)
    }

    async fn replace(&self, challenge: &OtpChallenge) -> Result<(), DomainError> {
        self.write(challenge).await?;
        debug!(
            mobile = %mask_phone_number(&challenge.mobile),
            purpose = %challenge.purpose,
            "Replaced OTP challenge in Redis"
        );
        Ok(())
    }

    async fn delete_all(&self, mobile: &str, purpose: OtpPurpose) -> Result<u64, DomainError> {
        Ok(self.client.delete(&self.key(mobile, purpose)).await?)
    }

    async fn delete(&self, challenge: &OtpChallenge) -> Result<bool, DomainError> {
        let deleted = self
            .client
            .eval_script(
                &DELETE_IF_ID,
                &self.key(&challenge.mobile, challenge.purpose),
                &[challenge.id.to_string()],
            )
            .await?;
        Ok(deleted == 1)
    }

    async fn save(&self, challenge: &OtpChallenge) -> Result<SaveOutcome, DomainError> {
        let next = OtpChallenge {
            version: challenge.version + 1,
            ..challenge.clone()
        };
        let payload = serde_json::to_string(&next).map_err(InfrastructureError::from)?;

        let swapped = self
            .client
            .eval_script(
                &COMPARE_AND_SWAP,
                &self.key(&challenge.mobile, challenge.purpose),
                &[
                    challenge.id.to_string(),
                    challenge.version.to_string(),
                    payload,
                ],
            )
            .await?;

        Ok(if swapped == 1 {
            SaveOutcome::Saved
        } else {
            SaveOutcome::Stale
        })
    }

    /// Redis expires keys natively; nothing to sweep
    async fn purge_expired(&self) -> Result<u64, DomainError> {
        Ok(0)
    }
}

/// Key suffix for a challenge, before the configured prefix is applied
pub fn challenge_key(mobile: &str, purpose: OtpPurpose) -> String {
    format!("challenge:{}:{}", purpose.as_str(), mobile)
}

/// Remaining lifetime in whole milliseconds, never less than one
pub fn ttl_millis(challenge: &OtpChallenge, now: DateTime<Utc>) -> u64 {
    (challenge.expires_at - now).num_milliseconds().max(1) as u64
}
