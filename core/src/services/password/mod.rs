//! bcrypt password hashing
//!
//! Hashing is CPU bound, so both operations run on the blocking pool.

use crate::errors::{DomainError, DomainResult};

/// Shortest password accepted when completing a registration
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// bcrypt hasher with a configurable cost
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext password
    pub async fn hash(&self, password: &str) -> DomainResult<String> {
        let password = password.to_owned();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Password hashing task failed: {}", e),
            })?
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to hash password: {}", e),
            })
    }

    /// Compare a plaintext password with a stored hash
    pub async fn verify(&self, password: &str, hash: &str) -> DomainResult<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Password verification task failed: {}", e),
            })?
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to verify password: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hasher = PasswordHasher::new(4);
        let hash = hasher.hash("secret123").await.unwrap();

        assert!(hash.starts_with("$2"));
        assert!(hasher.verify("secret123", &hash).await.unwrap());
        assert!(!hasher.verify("secret124", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_internal_error() {
        let hasher = PasswordHasher::new(4);
        let err = hasher.verify("secret123", "not-a-hash").await.unwrap_err();
        assert!(err.is_internal());
    }
}
