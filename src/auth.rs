// ABOUTME: JWT issuing and validation plus bcrypt password hashing
// ABOUTME: HS256 tokens carrying user id, email and audience with detailed failure reasons
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! # Authentication
//!
//! Tokens are HS256 JWTs signed with the configured secret. Validation
//! reports *why* a token failed (expired, bad signature, malformed) so the
//! middleware can log precise reasons while clients only see a 401.

use crate::constants::service_names::JWT_AUDIENCE;
use crate::database::User;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// `JWT` validation error with detailed information
#[derive(Debug, Clone, Error)]
pub enum JwtValidationError {
    /// Token has expired
    #[error("JWT token expired at {}", .expired_at.format("%Y-%m-%d %H:%M:%S UTC"))]
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
    },
    /// Signature, audience or claims are wrong
    #[error("JWT token is invalid: {reason}")]
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Not a JWT at all
    #[error("JWT token is malformed: {details}")]
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl From<JwtValidationError> for AppError {
    fn from(error: JwtValidationError) -> Self {
        match error {
            JwtValidationError::TokenExpired { .. } => Self::auth_expired(error.to_string()),
            JwtValidationError::TokenInvalid { .. } | JwtValidationError::TokenMalformed { .. } => {
                Self::auth_invalid(error.to_string())
            }
        }
    }
}

/// `JWT` claims for user authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a decimal string
    pub sub: String,
    /// User email
    pub email: String,
    /// Issued at, seconds since epoch
    pub iat: i64,
    /// Expiration, seconds since epoch
    pub exp: i64,
    /// Audience
    pub aud: String,
    /// Per-process counter keeping tokens issued within the same second distinct
    pub jti: u64,
}

impl Claims {
    /// Numeric user id from `sub`
    ///
    /// # Errors
    ///
    /// Returns an auth error when `sub` is not an integer
    pub fn user_id(&self) -> AppResult<i64> {
        self.sub
            .parse()
            .map_err(|_| AppError::auth_invalid("Token subject is not a user id"))
    }
}

/// Issues and validates HS256 tokens
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    token_counter: AtomicU64,
}

impl AuthManager {
    /// Create a new authentication manager
    #[must_use]
    pub fn new(secret: &str, token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry_hours,
            token_counter: AtomicU64::new(0),
        }
    }

    /// Token lifetime in hours
    #[must_use]
    pub const fn token_expiry_hours(&self) -> i64 {
        self.token_expiry_hours
    }

    /// Generate a token for `user`, returning it with its expiry
    ///
    /// # Errors
    ///
    /// Returns an internal error if JWT encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<(String, DateTime<Utc>)> {
        self.generate_token_at(user, Utc::now())
    }

    fn generate_token_at(
        &self,
        user: &User,
        now: DateTime<Utc>,
    ) -> AppResult<(String, DateTime<Utc>)> {
        let expires_at = now + Duration::hours(self.token_expiry_hours);
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            aud: JWT_AUDIENCE.to_owned(),
            jti: self.token_counter.fetch_add(1, Ordering::Relaxed),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))?;

        Ok((token, expires_at))
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] if the token is expired, signed with
    /// another key, meant for another audience, or not a JWT
    pub fn validate_token_detailed(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_audience(&[JWT_AUDIENCE]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| Self::convert_jwt_error(&e))?;

        if Utc::now().timestamp() >= claims.exp {
            let expired_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);
            tracing::warn!(user_id = %claims.sub, expired_at = %expired_at, "JWT token expired");
            return Err(JwtValidationError::TokenExpired { expired_at });
        }

        Ok(claims)
    }

    /// Validate a token, mapping failures to 401 errors
    ///
    /// # Errors
    ///
    /// Returns an auth error when validation fails
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        self.validate_token_detailed(token).map_err(AppError::from)
    }

    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;
        tracing::debug!("JWT token validation failed: {e:?}");

        match e.kind() {
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "signature verification failed".into(),
            },
            ErrorKind::InvalidAudience => JwtValidationError::TokenInvalid {
                reason: "wrong audience".into(),
            },
            ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
                details: "token format is invalid".into(),
            },
            ErrorKind::Base64(err) => JwtValidationError::TokenMalformed {
                details: format!("invalid base64: {err}"),
            },
            ErrorKind::Json(err) => JwtValidationError::TokenMalformed {
                details: format!("invalid JSON: {err}"),
            },
            ErrorKind::Utf8(err) => JwtValidationError::TokenMalformed {
                details: format!("invalid UTF-8: {err}"),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: e.to_string(),
            },
        }
    }
}

fn bcrypt_cost() -> u32 {
    if cfg!(debug_assertions) {
        4
    } else {
        bcrypt::DEFAULT_COST
    }
}

/// Hash a password with bcrypt on the blocking pool
///
/// # Errors
///
/// Returns an internal error if hashing fails or the blocking task panics
pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt_cost()))
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// Check a password against a bcrypt hash on the blocking pool
///
/// Malformed hashes count as a mismatch.
pub async fn verify_password(password: &str, hash: &str) -> bool {
    let password = password.to_owned();
    let hash = hash.to_owned();

    tokio::task::spawn_blocking(move || bcrypt::verify(&password, &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::dates;

    fn user() -> User {
        User {
            id: 42,
            email: "cook@example.com".to_owned(),
            name: Some("Cook".to_owned()),
            password_hash: String::new(),
            roles: vec!["ROLE_USER".to_owned()],
            is_active: true,
            created_at: dates::now(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let auth = AuthManager::new("secret", 24);
        let (token, expires_at) = auth.generate_token(&user()).unwrap();
        let claims = auth.validate_token(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.email, "cook@example.com");
        assert_eq!(claims.aud, JWT_AUDIENCE);
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn test_tokens_are_distinct() {
        let auth = AuthManager::new("secret", 24);
        let (a, _) = auth.generate_token(&user()).unwrap();
        let (b, _) = auth.generate_token(&user()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let (token, _) = AuthManager::new("one", 24).generate_token(&user()).unwrap();
        let err = AuthManager::new("two", 24)
            .validate_token_detailed(&token)
            .unwrap_err();
        assert!(matches!(err, JwtValidationError::TokenInvalid { .. }));
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = AuthManager::new("secret", 1);
        let (token, _) = auth
            .generate_token_at(&user(), Utc::now() - Duration::hours(2))
            .unwrap();
        let err = auth.validate_token_detailed(&token).unwrap_err();
        assert!(matches!(err, JwtValidationError::TokenExpired { .. }));

        let app_err = AppError::from(err);
        assert_eq!(app_err.http_status(), 401);
    }

    #[test]
    fn test_garbage_is_malformed() {
        let auth = AuthManager::new("secret", 24);
        let err = auth.validate_token_detailed("not-a-token").unwrap_err();
        assert!(matches!(err, JwtValidationError::TokenMalformed { .. }));
    }

    #[tokio::test]
    async fn test_password_hashing() {
        let hash = hash_password("correct horse").await.unwrap();
        assert!(verify_password("correct horse", &hash).await);
        assert!(!verify_password("wrong horse", &hash).await);
        assert!(!verify_password("correct horse", "not-a-hash").await);
    }
}
