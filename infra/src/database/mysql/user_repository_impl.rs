//! MySQL implementation of the UserRepository trait.
//!
//! Phone lookups tolerate a stored country-code prefix: a bare mobile matches
//! either `9876543210` or `+919876543210`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use pp_core::domain::entities::User;
use pp_core::errors::{DomainError, OtpError};
use pp_core::repositories::UserRepository;
use pp_shared::phone::{mask_phone_number, phone_variants};

use crate::InfrastructureError;

const USER_COLUMNS: &str = r#"
    SELECT id, first_name, last_name, email, phone, password_hash,
           account_number, balance, is_verified, avatar_url,
           created_at, updated_at
    FROM users
"#;

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
    /// Prefix tried alongside the bare mobile, e.g. `+91`
    country_code: String,
}

impl MySqlUserRepository {
    /// Create a new MySQL user repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    /// * `country_code` - Default country code used for phone lookups
    pub fn new(pool: MySqlPool, country_code: impl Into<String>) -> Self {
        Self {
            pool,
            country_code: country_code.into(),
        }
    }

    /// Convert database row to User entity
    fn row_to_user(row: &sqlx::mysql::MySqlRow) -> Result<User, InfrastructureError> {
        let id: String = row.try_get("id")?;

        Ok(User {
            id: Uuid::parse_str(&id)
                .map_err(|e| InfrastructureError::Corrupt(format!("Invalid user id: {}", e)))?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            password_hash: row.try_get("password_hash")?,
            account_number: row.try_get("account_number")?,
            balance: row.try_get("balance")?,
            is_verified: row.try_get("is_verified")?,
            avatar_url: row.try_get("avatar_url")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        })
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_phone(&self, mobile: &str) -> Result<Option<User>, DomainError> {
        let variants = phone_variants(mobile, &self.country_code);
        let placeholders = vec!["?"; variants.len()].join(", ");
        let query = format!("{} WHERE phone IN ({}) LIMIT 1", USER_COLUMNS, placeholders);

        let mut statement = sqlx::query(&query);
        for variant in &variants {
            statement = statement.bind(variant);
        }

        let row = statement
            .fetch_optional(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        Ok(row.as_ref().map(Self::row_to_user).transpose()?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        Ok(row.as_ref().map(Self::row_to_user).transpose()?)
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                id, first_name, last_name, email, phone, password_hash,
                account_number, balance, is_verified, avatar_url,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(&user.account_number)
        .bind(user.balance)
        .bind(user.is_verified)
        .bind(&user.avatar_url)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                tracing::info!(
                    user_id = %user.id,
                    phone = %mask_phone_number(&user.phone),
                    "Created user"
                );
                Ok(user)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(OtpError::UserAlreadyExists.into())
            }
            Err(e) => Err(InfrastructureError::from(e).into()),
        }
    }

    async fn set_verified(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE users SET is_verified = TRUE, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        Ok(result.rows_affected() > 0)
    }
}
