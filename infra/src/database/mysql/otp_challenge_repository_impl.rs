//! MySQL implementation of the OtpChallengeRepository trait.
//!
//! Every read carries an `expires_at > ?` predicate bound to the current
//! instant, so expired rows are invisible before the sweeper removes them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use tracing::{debug, error, info};
use uuid::Uuid;

use pp_core::domain::entities::{OtpChallenge, OtpPurpose};
use pp_core::errors::DomainError;
use pp_core::repositories::{OtpChallengeRepository, SaveOutcome};
use pp_shared::phone::mask_phone_number;

use crate::InfrastructureError;

const SELECT_COLUMNS: &str = r#"
    SELECT id, mobile, purpose, code, attempts, max_attempts,
           is_used, verified, version, created_at, expires_at
    FROM otp_challenges
"#;

/// MySQL-backed OTP challenge store
#[derive(Clone)]
pub struct MySqlOtpChallengeRepository {
    pool: MySqlPool,
}

impl MySqlOtpChallengeRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a challenge
    fn row_to_challenge(row: &sqlx::mysql::MySqlRow) -> Result<OtpChallenge, InfrastructureError> {
        let id: String = row.try_get("id")?;
        let purpose: String = row.try_get("purpose")?;

        Ok(OtpChallenge {
            id: Uuid::parse_str(&id)
                .map_err(|e| InfrastructureError::Corrupt(format!("Invalid challenge id: {}", e)))?,
            mobile: row.try_get("mobile")?,
            purpose: purpose
                .parse::<OtpPurpose>()
                .map_err(|e| InfrastructureError::Corrupt(e.to_string()))?,
            code: row.try_get("code")?,
            attempts: row.try_get("attempts")?,
            max_attempts: row.try_get("max_attempts")?,
            is_used: row.try_get("is_used")?,
            verified: row.try_get("verified")?,
            version: row.try_get("version")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            expires_at: row.try_get::<DateTime<Utc>, _>("expires_at")?,
        })
    }

    async fn fetch_newest(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
        unused_only: bool,
    ) -> Result<Option<OtpChallenge>, InfrastructureError> {
        let query = format!(
            "{} WHERE mobile = ? AND purpose = ? AND expires_at > ? {} ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS,
            if unused_only { "AND is_used = FALSE" } else { "" }
        );

        let row = sqlx::query(&query)
            .bind(mobile)
            .bind(purpose.as_str())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_challenge).transpose()
    }

    async fn insert<'e, E>(executor: E, challenge: &OtpChallenge) -> Result<(), sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::MySql>,
    {
        sqlx::query(
            r#"
            INSERT INTO otp_challenges (
                id, mobile, purpose, code, attempts, max_attempts,
                is_used, verified, version, created_at, expires_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(challenge.id.to_string())
        .bind(&challenge.mobile)
        .bind(challenge.purpose.as_str())
        .bind(&challenge.code)
        .bind(challenge.attempts)
        .bind(challenge.max_attempts)
        .bind(challenge.is_used)
        .bind(challenge.verified)
        .bind(challenge.version)
        .bind(challenge.created_at)
        .bind(challenge.expires_at)
        .execute(executor)
        .await
        .map(|_| ())
    }
}

#[async_trait]
impl OtpChallengeRepository for MySqlOtpChallengeRepository {
    async fn find_active(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpChallenge>, DomainError> {
        Ok(self.fetch_newest(mobile, purpose, true).await?)
    }

    async fn find_current(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpChallenge>, DomainError> {
        Ok(self.fetch_newest(mobile, purpose, false).await?)
    }

    async fn create(&self, challenge: &OtpChallenge) -> Result<(), DomainError> {
        Self::insert(&self.pool, challenge)
            .await
            .map_err(InfrastructureError::from)?;
        Ok(())
    }

    async fn replace(&self, challenge: &OtpChallenge) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(InfrastructureError::from)?;

        let deleted = sqlx::query("DELETE FROM otp_challenges WHERE mobile = ? AND purpose = ?")
            .bind(&challenge.mobile)
            .bind(challenge.purpose.as_str())
            .execute(&mut *tx)
            .await
            .map_err(InfrastructureError::from)?
            .rows_affected();

        Self::insert(&mut *tx, challenge)
            .await
            .map_err(InfrastructureError::from)?;

        tx.commit().await.map_err(|e| {
            error!(
                mobile = %mask_phone_number(&challenge.mobile),
                purpose = %challenge.purpose,
                error = %e,
                "Failed to commit challenge replacement"
            );
            InfrastructureError::from(e)
        })?;

        debug!(
            mobile = %mask_phone_number(&challenge.mobile),
            purpose = %challenge.purpose,
            superseded = deleted,
            "Replaced OTP challenge"
        );
        Ok(())
    }

    async fn delete_all(&self, mobile: &str, purpose: OtpPurpose) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM otp_challenges WHERE mobile = ? AND purpose = ?")
            .bind(mobile)
            .bind(purpose.as_str())
            .execute(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, challenge: &OtpChallenge) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM otp_challenges WHERE id = ?")
            .bind(challenge.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        Ok(result.rows_affected() == 1)
    }

    async fn save(&self, challenge: &OtpChallenge) -> Result<SaveOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE otp_challenges
            SET attempts = ?, is_used = ?, verified = ?, version = version + 1
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(challenge.attempts)
        .bind(challenge.is_used)
        .bind(challenge.verified)
        .bind(challenge.id.to_string())
        .bind(challenge.version)
        .execute(&self.pool)
        .await
        .map_err(InfrastructureError::from)?;

        if result.rows_affected() == 1 {
            Ok(SaveOutcome::Saved)
        } else {
            debug!(
                challenge_id = %challenge.id,
                expected_version = challenge.version,
                "Stale OTP challenge write rejected"
            );
            Ok(SaveOutcome::Stale)
        }
    }

    async fn purge_expired(&self) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM otp_challenges WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        let purged = result.rows_affected();
        if purged > 0 {
            info!(purged = purged, "Purged expired OTP challenges from MySQL");
        }
        Ok(purged)
    }
}
