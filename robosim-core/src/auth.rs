//! JWT authentication for robosim
//!
//! Uses stateless, short-lived access tokens:
//! - Issued by the login route after a credential check
//! - Presented as `Authorization: Bearer <token>` on every robot route
//! - Never revoked, they simply expire
//!
//! The decoded claims are not used for any per-user state.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT claims embedded in tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at (Unix timestamp)
    pub iat: u64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token encoding failed: {0}")]
    EncodingError(#[source] jsonwebtoken::errors::Error),

    #[error("Missing token")]
    MissingToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// JWT authentication handler
pub struct JwtAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: u64, // seconds
}

impl JwtAuth {
    /// Create new JWT auth handler
    ///
    /// # Arguments
    /// * `secret` - HMAC secret for signing tokens (should be >= 32 bytes)
    /// * `token_ttl` - Token lifetime in seconds (default: 1800 = 30 min)
    pub fn new(secret: &[u8], token_ttl: Option<u64>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl: token_ttl.unwrap_or(crate::DEFAULT_TOKEN_TTL),
        }
    }

    /// Issue a signed token for a user
    pub fn issue_token(&self, username: &str) -> Result<String, AuthError> {
        let now = unix_now();
        let claims = Claims {
            sub: username.to_string(),
            exp: now + self.token_ttl,
            iat: now,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::EncodingError)
    }

    /// Verify and decode a token
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }

    /// Check an `Authorization` header value and decode its token
    pub fn authorize(&self, header: Option<&str>) -> Result<Claims, AuthError> {
        let token = extract_bearer(header)?;
        self.verify_token(token)
    }

    /// Get the token TTL in seconds
    pub fn token_ttl(&self) -> u64 {
        self.token_ttl
    }
}

/// Pull the token out of an `Authorization` header value.
///
/// A `Bearer ` prefix is stripped when present; anything else is taken as
/// the raw token.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.unwrap_or_default().trim_start();
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Generate a secure random secret for JWT signing
pub fn generate_secret() -> [u8; 32] {
    use rand::Rng;
    rand::thread_rng().r#gen()
}

fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
