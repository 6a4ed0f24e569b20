//! Runtime selection of the challenge and user stores
//!
//! The OTP service is generic over its stores; these enums let the binary
//! pick a backend from configuration while keeping a single concrete type.

use async_trait::async_trait;
use uuid::Uuid;

use pp_core::domain::entities::{OtpChallenge, OtpPurpose, User};
use pp_core::errors::DomainError;
use pp_core::repositories::{
    InMemoryOtpChallengeRepository, InMemoryUserRepository, OtpChallengeRepository, SaveOutcome,
    UserRepository,
};
use pp_infra::cache::{RedisClient, RedisOtpChallengeRepository};
use pp_infra::database::{DatabasePool, MySqlOtpChallengeRepository, MySqlUserRepository};
use pp_infra::InfrastructureError;
use pp_shared::{AppConfig, StoreBackend};

/// OTP challenge store chosen by `store`
pub enum ChallengeStore {
    Memory(InMemoryOtpChallengeRepository),
    MySql(MySqlOtpChallengeRepository),
    Redis(RedisOtpChallengeRepository),
}

impl ChallengeStore {
    pub fn backend(&self) -> StoreBackend {
        match self {
            ChallengeStore::Memory(_) => StoreBackend::Memory,
            ChallengeStore::MySql(_) => StoreBackend::MySql,
            ChallengeStore::Redis(_) => StoreBackend::Redis,
        }
    }

    fn inner(&self) -> &dyn OtpChallengeRepository {
        match self {
            ChallengeStore::Memory(store) => store,
            ChallengeStore::MySql(store) => store,
            ChallengeStore::Redis(store) => store,
        }
    }
}

#[async_trait]
impl OtpChallengeRepository for ChallengeStore {
    async fn find_active(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpChallenge>, DomainError> {
        self.inner().find_active(mobile, purpose).await
    }

    async fn find_current(
        &self,
        mobile: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpChallenge>, DomainError> {
        self.inner().find_current(mobile, purpose).await
    }

    async fn create(&self, challenge: &OtpChallenge) -> Result<(), DomainError> {
        self.inner().create(challenge).await
    }

    async fn replace(&self, challenge: &OtpChallenge) -> Result<(), DomainError> {
        self.inner().replace(challenge).await
    }

    async fn delete_all(&self, mobile: &str, purpose: OtpPurpose) -> Result<u64, DomainError> {
        self.inner().delete_all(mobile, purpose).await
    }

    async fn delete(&self, challenge: &OtpChallenge) -> Result<bool, DomainError> {
        self.inner().delete(challenge).await
    }

    async fn save(&self, challenge: &OtpChallenge) -> Result<SaveOutcome, DomainError> {
        self.inner().save(challenge).await
    }

    async fn purge_expired(&self) -> Result<u64, DomainError> {
        self.inner().purge_expired().await
    }
}

/// User store; MySQL whenever a database-backed challenge store is in use
pub enum UserStore {
    Memory(InMemoryUserRepository),
    MySql(MySqlUserRepository),
}

impl UserStore {
    fn inner(&self) -> &dyn UserRepository {
        match self {
            UserStore::Memory(store) => store,
            UserStore::MySql(store) => store,
        }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_phone(&self, mobile: &str) -> Result<Option<User>, DomainError> {
        self.inner().find_by_phone(mobile).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.inner().find_by_id(id).await
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        self.inner().create(user).await
    }

    async fn set_verified(&self, id: Uuid) -> Result<bool, DomainError> {
        self.inner().set_verified(id).await
    }
}

/// Connect the stores selected by `config.store`
///
/// The MySQL pool is opened for both the `mysql` and `redis` backends since
/// accounts always live in the `users` table outside development.
pub async fn build_stores(
    config: &AppConfig,
) -> Result<(ChallengeStore, UserStore), InfrastructureError> {
    if config.store == StoreBackend::Memory {
        tracing::warn!("Using in-memory stores; challenges and users are lost on restart");
        return Ok((
            ChallengeStore::Memory(InMemoryOtpChallengeRepository::new()),
            UserStore::Memory(InMemoryUserRepository::new()),
        ));
    }

    let pool = DatabasePool::new(config.database.clone()).await?;
    if config.database.run_migrations {
        pool.run_migrations().await?;
    }

    let users = UserStore::MySql(MySqlUserRepository::new(
        pool.get_pool().clone(),
        config.otp.default_country_code.clone(),
    ));

    let challenges = match config.store {
        StoreBackend::Redis => {
            let client = RedisClient::new(config.cache.clone()).await?;
            ChallengeStore::Redis(RedisOtpChallengeRepository::new(client))
        }
        _ => ChallengeStore::MySql(MySqlOtpChallengeRepository::new(pool.get_pool().clone())),
    };

    tracing::info!(backend = %challenges.backend(), "OTP challenge store ready");
    Ok((challenges, users))
}
