//! User entity representing an account holder.

use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, Rng};
use serde::Serialize;
use uuid::Uuid;

const ACCOUNT_NUMBER_MIN: u64 = 100_000_000_000;
const ACCOUNT_NUMBER_MAX: u64 = 999_999_999_999;

/// Account holder record
///
/// `password_hash` never leaves the domain; use [`UserProfile`] for anything
/// that is serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Stored phone number, bare or prefixed with a country code
    pub phone: String,
    /// bcrypt hash
    pub password_hash: String,
    pub account_number: String,
    /// Balance in minor units
    pub balance: i64,
    pub is_verified: bool,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Builds the account created when a verified registration completes
    ///
    /// Placeholder names and email are derived from the mobile number; the
    /// account starts verified with a zero balance.
    pub fn new_registered(mobile: &str, password_hash: String) -> Self {
        let now = Utc::now();
        let last_four = &mobile[mobile.len().saturating_sub(4)..];

        Self {
            id: Uuid::new_v4(),
            first_name: "User".to_string(),
            last_name: last_four.to_string(),
            email: format!("user_{}@palmpay.com", mobile),
            phone: mobile.to_string(),
            password_hash,
            account_number: Self::generate_account_number(),
            balance: 0,
            is_verified: true,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 12-digit account number without a leading zero
    pub fn generate_account_number() -> String {
        OsRng
            .gen_range(ACCOUNT_NUMBER_MIN..=ACCOUNT_NUMBER_MAX)
            .to_string()
    }

    /// Marks the user as verified
    pub fn verify(&mut self) {
        self.is_verified = true;
        self.updated_at = Utc::now();
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

/// Public projection of a [`User`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub account_number: String,
    pub balance: i64,
    pub is_verified: bool,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            account_number: user.account_number.clone(),
            balance: user.balance,
            is_verified: user.is_verified,
            avatar_url: user.avatar_url.clone(),
            created_at: user.created_at,
        }
    }
}
