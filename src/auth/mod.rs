use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Staff id of the signed-in user
    pub sub: String,
    pub roles: Vec<String>,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
}

/// Signs and verifies access tokens (HS256)
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    issuer: String,
    expiry_hours: u64,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>, expiry_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            expiry_hours,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(&security.jwt_secret, &security.jwt_issuer, security.jwt_expiry_hours)
    }

    pub fn expires_in_secs(&self) -> u64 {
        self.expiry_hours.saturating_mul(3600)
    }

    pub fn issue(&self, staff_id: &str, roles: &[String]) -> Result<String, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let now = Utc::now();
        let expires_at = i64::try_from(self.expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                JwtError::TokenGeneration(format!("token lifetime of {} hours is out of range", self.expiry_hours))
            })?;
        let claims = Claims {
            sub: staff_id.to_string(),
            roles: roles.to_vec(),
            iss: self.issuer.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let mut validation = Validation::default();
        validation.set_issuer(&[self.issuer.as_str()]);

        decode::<Claims>(token, &DecodingKey::from_secret(self.secret.as_bytes()), &validation)
            .map(|data| data.claims)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))
    }
}

/// Hash a password with bcrypt on the blocking pool
pub async fn hash_password(password: String, cost: u32) -> Result<String, bcrypt::BcryptError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .unwrap_or_else(|e| Err(bcrypt::BcryptError::Io(std::io::Error::other(e))))
}

/// Check a password against a stored bcrypt hash. A malformed hash never verifies.
pub async fn verify_password(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret", "staff-management-api", 1)
    }

    #[test]
    fn issued_tokens_verify_with_claims() {
        let token = issuer()
            .issue("25001", &["Admin".to_string(), "Staff".to_string()])
            .unwrap();
        let claims = issuer().verify(&token).unwrap();
        assert_eq!(claims.sub, "25001");
        assert_eq!(claims.roles, vec!["Admin", "Staff"]);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let token = TokenIssuer::new("other", "staff-management-api", 1)
            .issue("25001", &[])
            .unwrap();
        assert!(matches!(issuer().verify(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        let issuer = TokenIssuer::new("", "staff-management-api", 1);
        assert!(matches!(issuer.issue("25001", &[]), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn oversized_lifetime_is_an_error() {
        let issuer = TokenIssuer::new("test-secret", "staff-management-api", u64::MAX);
        assert!(matches!(issuer.issue("25001", &[]), Err(JwtError::TokenGeneration(_))));
        assert_eq!(issuer.expires_in_secs(), u64::MAX);

        let issuer = TokenIssuer::new("test-secret", "staff-management-api", 10_000_000_000);
        assert!(matches!(issuer.issue("25001", &[]), Err(JwtError::TokenGeneration(_))));
    }

    #[tokio::test]
    async fn password_hash_round_trip() {
        let hash = hash_password("s3cret".to_string(), 4).await.unwrap();
        assert!(verify_password("s3cret".to_string(), hash.clone()).await);
        assert!(!verify_password("wrong".to_string(), hash).await);
        assert!(!verify_password("s3cret".to_string(), "not-a-hash".to_string()).await);
    }
}
