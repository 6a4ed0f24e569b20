//! JWT token issuer

use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::domain::entities::token::Claims;
use crate::errors::{DomainError, DomainResult, ValidationError};

use super::config::TokenServiceConfig;

/// Issues opaque bearer tokens for authenticated users
pub trait TokenIssuer: Send + Sync {
    /// Create a token whose subject is `user_id`
    fn issue(&self, user_id: Uuid) -> DomainResult<String>;

    /// Check a presented token; `INVALID_TOKEN` unless it is genuine and current
    fn verify(&self, token: &str) -> DomainResult<Claims>;
}

/// HS256 JWT implementation of [`TokenIssuer`]
pub struct JwtTokenIssuer {
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenIssuer {
    /// Creates a new token issuer
    ///
    /// # Arguments
    ///
    /// * `config` - Secret, issuer and lifetime
    pub fn new(config: TokenServiceConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.validate_exp = true;

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Decode and validate a token
    ///
    /// # Returns
    ///
    /// * `Ok(Claims)` - Signature, issuer and expiry are valid
    /// * `Err(DomainError)` - `INVALID_TOKEN` for anything else
    pub fn verify(&self, token: &str) -> DomainResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, event = "token_rejected", "Token verification failed");
                ValidationError::InvalidToken.into()
            })
    }

    pub fn expiry_seconds(&self) -> i64 {
        self.config.expiry_seconds
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, user_id: Uuid) -> DomainResult<String> {
        let claims = Claims::new(
            user_id,
            &self.config.issuer,
            Duration::seconds(self.config.expiry_seconds),
        );

        encode(&Header::new(self.config.algorithm), &claims, &self.encoding_key).map_err(|e| {
            DomainError::Internal {
                message: format!("Failed to sign token: {}", e),
            }
        })
    }

    fn verify(&self, token: &str) -> DomainResult<Claims> {
        JwtTokenIssuer::verify(self, token)
    }
}
