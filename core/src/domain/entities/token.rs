//! Claims carried by bearer tokens.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default token lifetime (30 days)
pub const TOKEN_EXPIRY_DAYS: i64 = 30;

/// JWT issuer
pub const JWT_ISSUER: &str = "palmpay";

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl Claims {
    /// Creates claims for a user token
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user's UUID
    /// * `issuer` - Value of the `iss` claim
    /// * `lifetime` - Time until `exp`
    pub fn new(user_id: Uuid, issuer: &str, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            iss: issuer.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Parses the subject back into a user id
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_lifetime() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, JWT_ISSUER, Duration::days(TOKEN_EXPIRY_DAYS));

        assert_eq!(claims.user_id(), Some(user_id));
        assert_eq!(claims.exp - claims.iat, TOKEN_EXPIRY_DAYS * 86400);
        assert_eq!(claims.iss, "palmpay");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_unique_jti() {
        let user_id = Uuid::new_v4();
        let a = Claims::new(user_id, JWT_ISSUER, Duration::days(1));
        let b = Claims::new(user_id, JWT_ISSUER, Duration::days(1));
        assert_ne!(a.jti, b.jti);
    }
}
