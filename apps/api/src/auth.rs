//! # Authentication
//!
//! JWT access/refresh tokens, argon2 password hashes, and the extractors
//! handlers use to require a caller.
//!
//! ## Token Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/auth/{admin|cashier}/login  ── email + password             │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  argon2 verify ──► TokenPair { access (1h), refresh (7d) }              │
//! │                                                                         │
//! │  Authorization: Bearer <access>                                         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  AuthUser ──► AdminUser   (role = admin, else 403)                      │
//! │           └─► CashierUser (role = cashier, else 403)                    │
//! │                                                                         │
//! │  POST /api/auth/refresh ── refresh token ──► new TokenPair              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

// =============================================================================
// Claims
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Cashier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Admin or cashier id.
    pub sub: String,
    pub role: Role,
    /// Set for cashiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    /// "access" or "refresh".
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

// =============================================================================
// JWT Manager
// =============================================================================

pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_lifetime_secs: i64,
    refresh_lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: String, access_lifetime_secs: i64, refresh_lifetime_secs: i64) -> Self {
        JwtManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_lifetime_secs,
            refresh_lifetime_secs,
        }
    }

    /// Issues an access and a refresh token for the same identity.
    pub fn issue(&self, sub: &str, role: Role, shop_id: Option<&str>) -> ApiResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.generate(sub, role, shop_id, ACCESS, self.access_lifetime_secs)?,
            refresh_token: self.generate(sub, role, shop_id, REFRESH, self.refresh_lifetime_secs)?,
            token_type: "Bearer",
            expires_in: self.access_lifetime_secs,
        })
    }

    fn generate(
        &self,
        sub: &str,
        role: Role,
        shop_id: Option<&str>,
        token_type: &str,
        lifetime_secs: i64,
    ) -> ApiResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            role,
            shop_id: shop_id.map(str::to_string),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(lifetime_secs)).timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to generate token: {e}")))
    }

    fn validate(&self, token: &str, expected_type: &str) -> ApiResult<Claims> {
        let claims = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|e| ApiError::unauthorized(format!("Invalid token: {e}")))?
            .claims;

        if claims.token_type != expected_type {
            return Err(ApiError::unauthorized(format!(
                "Expected {expected_type} token"
            )));
        }
        Ok(claims)
    }

    pub fn validate_access_token(&self, token: &str) -> ApiResult<Claims> {
        self.validate(token, ACCESS)
    }

    pub fn validate_refresh_token(&self, token: &str) -> ApiResult<Claims> {
        self.validate(token, REFRESH)
    }
}

/// Extracts the token from an `Authorization: Bearer ...` header value.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// Passwords
// =============================================================================

pub fn hash_password(password: &str) -> ApiResult<String> {
    use argon2::password_hash::{rand_core::OsRng, SaltString};
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))?;

    Ok(hash.to_string())
}

/// False for a wrong password and for a malformed stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// Extractors
// =============================================================================

/// Any authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub role: Role,
    pub shop_id: Option<String>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(self) -> ApiResult<AdminUser> {
        match self.role {
            Role::Admin => Ok(AdminUser(self)),
            Role::Cashier => Err(ApiError::forbidden("Admin access required")),
        }
    }

    pub fn require_cashier(self) -> ApiResult<CashierUser> {
        match (self.role, self.shop_id.clone()) {
            (Role::Cashier, Some(shop_id)) => Ok(CashierUser {
                id: self.id,
                shop_id,
            }),
            _ => Err(ApiError::forbidden("Cashier access required")),
        }
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        AuthUser {
            id: claims.sub,
            role: claims.role,
            shop_id: claims.shop_id,
        }
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("Expected a Bearer token"))?;

        state.jwt.validate_access_token(token).map(AuthUser::from)
    }
}

/// Caller with role admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl FromRequestParts<SharedState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        AuthUser::from_request_parts(parts, state)
            .await?
            .require_admin()
    }
}

/// Caller with role cashier; always has a shop.
#[derive(Debug, Clone)]
pub struct CashierUser {
    pub id: String,
    pub shop_id: String,
}

impl FromRequestParts<SharedState> for CashierUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        AuthUser::from_request_parts(parts, state)
            .await?
            .require_cashier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn manager() -> JwtManager {
        JwtManager::new("test-secret-long-enough".to_string(), 3600, 86400)
    }

    #[test]
    fn test_jwt_roundtrip() {
        let pair = manager().issue("k-1", Role::Cashier, Some("s-1")).unwrap();
        let claims = manager().validate_access_token(&pair.access_token).unwrap();

        assert_eq!(claims.sub, "k-1");
        assert_eq!(claims.role, Role::Cashier);
        assert_eq!(claims.shop_id.as_deref(), Some("s-1"));
        assert_eq!(pair.expires_in, 3600);
    }

    #[test]
    fn test_wrong_token_type() {
        let pair = manager().issue("a-1", Role::Admin, None).unwrap();

        assert!(manager().validate_refresh_token(&pair.access_token).is_err());
        assert!(manager().validate_access_token(&pair.refresh_token).is_err());
        assert!(manager().validate_refresh_token(&pair.refresh_token).is_ok());
    }

    #[test]
    fn test_expired_and_foreign_tokens_rejected() {
        let expired = JwtManager::new("test-secret-long-enough".to_string(), -600, 86400)
            .issue("a-1", Role::Admin, None)
            .unwrap();
        let err = manager()
            .validate_access_token(&expired.access_token)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);

        let foreign = JwtManager::new("another-secret-entirely".to_string(), 3600, 86400)
            .issue("a-1", Role::Admin, None)
            .unwrap();
        assert!(manager().validate_access_token(&foreign.access_token).is_err());
    }

    #[test]
    fn test_role_requirements() {
        let cashier = AuthUser {
            id: "k-1".to_string(),
            role: Role::Cashier,
            shop_id: Some("s-1".to_string()),
        };
        assert!(cashier.clone().require_cashier().is_ok());
        assert_eq!(
            cashier.require_admin().unwrap_err().code,
            ErrorCode::Forbidden
        );

        let admin = AuthUser {
            id: "a-1".to_string(),
            role: Role::Admin,
            shop_id: None,
        };
        assert!(admin.clone().require_admin().is_ok());
        assert!(admin.require_cashier().is_err());
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("Sup3rSecret").unwrap();
        assert!(verify_password("Sup3rSecret", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("Sup3rSecret", "not-a-hash"));
    }

    #[test]
    fn test_bearer_extraction() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }
}
