//! Access/refresh JWT pairs (HS256, zero leeway).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use trai_domain::enums::Role;
use trai_kernel::safe_nanoid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User key.
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// A freshly signed pair; only the refresh token's hash is ever stored.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TokenService {
    access_secret: Arc<str>,
    refresh_secret: Arc<str>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    #[must_use]
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    /// # Errors
    /// Signing failures from `jsonwebtoken`.
    pub fn issue(&self, user_key: &str, role: Role) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let access = self.claims(user_key, role, now, self.access_ttl);
        let refresh = self.claims(user_key, role, now, self.refresh_ttl);
        let refresh_expires_at = now + self.refresh_ttl;

        Ok(TokenPair {
            access_token: sign(&access, &self.access_secret)?,
            refresh_token: sign(&refresh, &self.refresh_secret)?,
            refresh_expires_at,
        })
    }

    /// # Errors
    /// Bad signature, malformed token or `exp` in the past.
    pub fn verify_access(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        verify(token, &self.access_secret)
    }

    /// # Errors
    /// Bad signature, malformed token or `exp` in the past.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        verify(token, &self.refresh_secret)
    }

    fn claims(&self, user_key: &str, role: Role, now: DateTime<Utc>, ttl: Duration) -> Claims {
        Claims {
            sub: user_key.to_owned(),
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: safe_nanoid!(21),
        }
    }
}

/// Lowercase hex sha256, the stored form of a refresh token.
#[must_use]
pub fn token_hash(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn sign(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret.as_bytes()))
}

fn verify(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub", "iat"]);
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(access_ttl: Duration) -> TokenService {
        TokenService::new("access-secret", "refresh-secret", access_ttl, Duration::days(7))
    }

    #[test]
    fn pair_round_trips_with_matching_secrets() {
        let tokens = service(Duration::minutes(15));
        let pair = tokens.issue("u1", Role::Pro).unwrap();

        let access = tokens.verify_access(&pair.access_token).unwrap();
        assert_eq!(access.sub, "u1");
        assert_eq!(access.role, Role::Pro);
        assert_eq!(access.exp - access.iat, 15 * 60);

        let refresh = tokens.verify_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.exp - refresh.iat, 7 * 24 * 60 * 60);
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn secrets_are_not_interchangeable() {
        let tokens = service(Duration::minutes(15));
        let pair = tokens.issue("u1", Role::User).unwrap();
        assert!(tokens.verify_access(&pair.refresh_token).is_err());
        assert!(tokens.verify_refresh(&pair.access_token).is_err());
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let tokens = service(Duration::seconds(-5));
        let pair = tokens.issue("u1", Role::User).unwrap();
        let err = tokens.verify_access(&pair.access_token).unwrap_err();
        assert!(matches!(err.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature));
    }

    #[test]
    fn hashes_are_stable_hex() {
        assert_eq!(token_hash("abc").len(), 64);
        assert_eq!(token_hash("abc"), token_hash("abc"));
        assert_ne!(token_hash("abc"), token_hash("abd"));
    }
}
