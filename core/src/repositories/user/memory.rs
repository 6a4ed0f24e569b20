//! In-memory implementation of UserRepository

use async_trait::async_trait;
use pp_shared::phone::phone_variants;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::{DomainError, OtpError};

use super::trait_::UserRepository;

const DEFAULT_COUNTRY_CODE: &str = "+91";

/// User store backed by a map, for tests and the development profile
#[derive(Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    country_code: String,
}

impl InMemoryUserRepository {
    /// Create a new repository using the default `+91` country code
    pub fn new() -> Self {
        Self::with_country_code(DEFAULT_COUNTRY_CODE)
    }

    pub fn with_country_code(country_code: impl Into<String>) -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            country_code: country_code.into(),
        }
    }

    /// Insert a user directly, bypassing duplicate checks
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_phone(&self, mobile: &str) -> Result<Option<User>, DomainError> {
        let variants = phone_variants(mobile, &self.country_code);
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| variants.iter().any(|v| *v == u.phone))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;

        if users
            .values()
            .any(|u| u.phone == user.phone || u.email == user.email)
        {
            return Err(OtpError::UserAlreadyExists.into());
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_verified(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) => {
                user.verify();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
