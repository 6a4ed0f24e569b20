//! User repository trait defining the interface for user data persistence.
//!
//! The OTP manager only needs lookups, creation and the verified flag; the
//! rest of the account lifecycle lives elsewhere.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by normalized mobile number
    ///
    /// Matches a stored phone equal to the bare number or to the number
    /// prefixed with the store's default country code.
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user found with given phone
    /// * `Err(DomainError)` - Storage failure
    async fn find_by_phone(&self, mobile: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by their unique identifier
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Create a new user
    ///
    /// # Returns
    /// * `Ok(User)` - The created user
    /// * `Err(DomainError::Otp(OtpError::UserAlreadyExists))` - Phone or email taken
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Mark a user as verified
    ///
    /// # Returns
    /// * `Ok(true)` - Flag set
    /// * `Ok(false)` - No such user
    async fn set_verified(&self, id: Uuid) -> Result<bool, DomainError>;
}
