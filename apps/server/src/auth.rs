use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use loanbook_core::users::UserRole;

use crate::error::ApiError;
use crate::main_lib::AppState;

const TOKEN_TTL_HOURS: i64 = 12;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Email of the authenticated principal
    pub sub: String,
    pub role: String,
    /// Present for customer-portal tokens only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin.as_str()
    }

    /// Role check for back-office endpoints, done before the engine is
    /// invoked.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin role required".to_string()))
        }
    }

    /// Returns the customer id of a portal token.
    pub fn require_customer(&self) -> Result<&str, ApiError> {
        self.customer_id
            .as_deref()
            .filter(|_| self.role == UserRole::Customer.as_str())
            .ok_or_else(|| ApiError::Forbidden("Customer token required".to_string()))
    }
}

/// Issues and verifies access tokens.
pub struct AuthManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl AuthManager {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue_token(
        &self,
        subject: &str,
        role: UserRole,
        customer_id: Option<String>,
    ) -> Result<String, ApiError> {
        let claims = Claims {
            sub: subject.to_string(),
            role: role.as_str().to_string(),
            customer_id,
            exp: (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("Failed to issue token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))
    }
}

/// Hashes a raw password for storage.
pub fn hash_password(raw: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verifies a raw password against a stored hash.
pub fn verify_password(raw: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(raw.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Extractor for the authenticated principal. Rejects requests without a
/// valid bearer token.
pub struct AuthUser(pub Claims);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Expected a bearer token".to_string()))?;

        Ok(AuthUser(state.auth.verify(token)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_claims() {
        let auth = AuthManager::new("test-secret");
        let token = auth
            .issue_token("admin@example.com", UserRole::Admin, None)
            .unwrap();
        let claims = auth.verify(&token).unwrap();
        assert_eq!(claims.sub, "admin@example.com");
        assert!(claims.is_admin());
        assert!(claims.require_admin().is_ok());
        assert!(claims.require_customer().is_err());
    }

    #[test]
    fn customer_token_carries_customer_id() {
        let auth = AuthManager::new("test-secret");
        let token = auth
            .issue_token(
                "maria@example.com",
                UserRole::Customer,
                Some("cust-1".to_string()),
            )
            .unwrap();
        let claims = auth.verify(&token).unwrap();
        assert_eq!(claims.require_customer().unwrap(), "cust-1");
        assert!(claims.require_admin().is_err());
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let auth = AuthManager::new("test-secret");
        let other = AuthManager::new("other-secret");
        let token = other
            .issue_token("admin@example.com", UserRole::Admin, None)
            .unwrap();
        assert!(auth.verify(&token).is_err());
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(verify_password("s3cret!", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret!", "not-a-hash"));
    }
}
