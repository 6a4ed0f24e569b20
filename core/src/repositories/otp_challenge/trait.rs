//! OTP challenge store contract.
//!
//! Every implementation treats expiry as an implicit tombstone: no read returns
//! a challenge whose `expires_at` is at or before the current instant, whether
//! or not `purge_expired` has run.

use async_trait::async_trait;

use crate::domain::entities::otp_challenge::{OtpChallenge, OtpPurpose};
use crate::errors::DomainError;

/// Result of a compare-and-swap save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The stored revision matched and was overwritten
    Saved,
    /// The stored challenge moved on or no longer exists
    Stale,
}

/// Repository trait for OTP challenge persistence
#[async_trait]
pub trait OtpChallengeRepository: Send + Sync {
    /// Newest challenge for the key that is neither used nor expired
    async fn find_active(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpChallenge>, DomainError>;

    /// Newest unexpired challenge for the key, used or not
    async fn find_current(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpChallenge>, DomainError>;

    /// Insert a challenge without touching existing ones
    async fn create(&self, challenge: &OtpChallenge) -> Result<(), DomainError>;

    /// Delete every challenge for the key and insert `challenge` as one unit
    ///
    /// The default runs the two steps back to back; stores that can do better
    /// (transactions, single-key writes) override it.
    async fn replace(&self, challenge: &OtpChallenge) -> Result<(), DomainError> {
        self.delete_all(&challenge.mobile, challenge.purpose).await?;
        self.create(challenge).await
    }

    /// Delete every challenge for the key, returning how many were removed
    async fn delete_all(&self, mobile: &str, purpose: OtpPurpose) -> Result<u64, DomainError>;

    /// Delete the stored challenge with `challenge.id`, leaving any other
    /// challenge for the key in place. Returns whether it was still stored.
    async fn delete(&self, challenge: &OtpChallenge) -> Result<bool, DomainError>;

    /// Compare-and-swap write
    ///
    /// `challenge.version` is the revision the caller read. The write succeeds
    /// only if the stored challenge with the same id still has that revision,
    /// in which case the stored copy ends up at `version + 1`.
    async fn save(&self, challenge: &OtpChallenge) -> Result<SaveOutcome, DomainError>;

    /// Physically remove expired challenges, returning how many were removed
    async fn purge_expired(&self) -> Result<u64, DomainError>;
}
