//! Configuration for the token issuer

use jsonwebtoken::Algorithm;
use pp_shared::JwtConfig;

use crate::domain::entities::token::{JWT_ISSUER, TOKEN_EXPIRY_DAYS};

/// Configuration for the token issuer
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    /// Value of the `iss` claim
    pub issuer: String,
    /// Token lifetime in seconds
    pub expiry_seconds: i64,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "development-secret-please-change-in-production".to_string(),
            algorithm: Algorithm::HS256,
            issuer: JWT_ISSUER.to_string(),
            expiry_seconds: TOKEN_EXPIRY_DAYS * 86400,
        }
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(config: &JwtConfig) -> Self {
        Self {
            jwt_secret: config.secret.clone(),
            algorithm: Algorithm::HS256,
            issuer: config.issuer.clone(),
            expiry_seconds: config.expiry_seconds,
        }
    }
}
