//! In-memory OTP challenge store for tests and the development profile

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::otp_challenge::{OtpChallenge, OtpPurpose};
use crate::errors::DomainError;

use super::trait_::{OtpChallengeRepository, SaveOutcome};

type ChallengeKey = (String, OtpPurpose);

/// Challenges grouped by (mobile, purpose)
#[derive(Clone, Default)]
pub struct InMemoryOtpChallengeRepository {
    challenges: Arc<RwLock<HashMap<ChallengeKey, Vec<OtpChallenge>>>>,
}

impl InMemoryOtpChallengeRepository {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored challenges, expired ones included
    pub async fn len(&self) -> usize {
        self.challenges.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Every stored challenge for a key, expired ones included
    pub async fn all_for(&self, mobile: &str, purpose: OtpPurpose) -> Vec<OtpChallenge> {
        self.challenges
            .read()
            .await
            .get(&(mobile.to_string(), purpose))
            .cloned()
            .unwrap_or_default()
    }

    async fn newest_matching<F>(&self, mobile: &str, purpose: OtpPurpose, keep: F) -> Option<OtpChallenge>
    where
        F: Fn(&OtpChallenge) -> bool,
    {
        let now = Utc::now();
        let challenges = self.challenges.read().await;
        challenges
            .get(&(mobile.to_string(), purpose))?
            .iter()
            .filter(|c| !c.is_expired_at(now) && keep(c))
            .max_by_key(|c| c.created_at)
            .cloned()
    }
}

#[async_trait]
impl OtpChallengeRepository for InMemoryOtpChallengeRepository {
    async fn find_active(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpChallenge>, DomainError> {
        Ok(self.newest_matching(mobile, purpose, |c| !c.is_used).await)
    }

    async fn find_current(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpChallenge>, DomainError> {
        Ok(self.newest_matching(mobile, purpose, |_| true).await)
    }

    async fn create(&self, challenge: &OtpChallenge) -> Result<(), DomainError> {
        let mut challenges = self.challenges.write().await;
        challenges
            .entry((challenge.mobile.clone(), challenge.purpose))
            .or_default()
            .push(challenge.clone());
        Ok(())
    }

    async fn replace(&self, challenge: &OtpChallenge) -> Result<(), DomainError> {
        let mut challenges = self.challenges.write().await;
        challenges.insert(
            (challenge.mobile.clone(), challenge.purpose),
            vec![challenge.clone()],
        );
        Ok(())
    }

    async fn delete_all(&self, mobile: &str, purpose: OtpPurpose) -> Result<u64, DomainError> {
        let mut challenges = self.challenges.write().await;
        Ok(challenges
            .remove(&(mobile.to_string(), purpose))
            .map(|removed| removed.len() as u64)
            .unwrap_or(0))
    }

    async fn delete(&self, challenge: &OtpChallenge) -> Result<bool, DomainError> {
        let mut challenges = self.challenges.write().await;
        let key = (challenge.mobile.clone(), challenge.purpose);
        let Some(list) = challenges.get_mut(&key) else {
            return Ok(false);
        };

        let before = list.len();
        list.retain(|c| c.id != challenge.id);
        let removed = list.len() < before;
        if list.is_empty() {
            challenges.remove(&key);
        }
        Ok(removed)
    }

    async fn save(&self, challenge: &OtpChallenge) -> Result<SaveOutcome, DomainError> {
        let mut challenges = self.challenges.write().await;
        let stored = challenges
            .get_mut(&(challenge.mobile.clone(), challenge.purpose))
            .and_then(|list| list.iter_mut().find(|c| c.id == challenge.id));

        match stored {
            Some(stored) if stored.version == challenge.version => {
                *stored = OtpChallenge {
                    version: challenge.version + 1,
                    ..challenge.clone()
                };
                Ok(SaveOutcome::Saved)
            }
            _ => Ok(SaveOutcome::Stale),
        }
    }

    async fn purge_expired(&self) -> Result<u64, DomainError> {
        let now = Utc::now();
        let mut challenges = self.challenges.write().await;
        let mut purged = 0u64;

        challenges.retain(|_, list| {
            let before = list.len();
            list.retain(|c| !c.is_expired_at(now));
            purged += (before - list.len()) as u64;
            !list.is_empty()
        });

        Ok(purged)
    }
}
