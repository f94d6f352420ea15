//! # JWT Token Management
//!
//! JWT token generation, validation, and management.
//!
//! Tokens are HS256-signed JWTs whose payload embeds a caller-provided user
//! snapshot next to the standard `iat`/`exp` claims. The signing key and TTL
//! come from an explicit [`TokenConfig`]; nothing is read from the environment
//! here.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{Error, Result};

/// The only algorithm tokens are signed with and accepted under.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT Claims structure carrying the embedded user snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims<T> {
    /// Point-in-time user snapshot
    pub user: T,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Signing key and token lifetime.
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Convenience constructor for hour-granular lifetimes.
    pub fn with_hours(secret: impl Into<String>, hours: i64) -> Self {
        Self::new(secret, Duration::hours(hours))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"***REDACTED***")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Stateless token signer/verifier.
#[derive(Debug, Clone)]
pub struct TokenService {
    config: TokenConfig,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Sign a token for `user`, valid for the configured TTL from now.
    pub fn issue<T: Serialize>(&self, user: &T) -> Result<String> {
        self.issue_at(user, Utc::now())
    }

    /// Sign a token as if issued at `issued_at`.
    pub fn issue_at<T: Serialize>(&self, user: &T, issued_at: DateTime<Utc>) -> Result<String> {
        if self.config.secret.is_empty() {
            return Err(Error::Signing("signing key is not configured".to_string()));
        }

        let claims = Claims {
            user,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.config.ttl).timestamp(),
        };

        encode(
            &Header::new(TOKEN_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| Error::Signing(e.to_string()))
    }

    /// Verify algorithm, signature and expiry, then return the full claim set.
    pub fn decode_claims<T: DeserializeOwned + Clone>(&self, token: &str) -> Result<Claims<T>> {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = 0;

        let token_data = decode::<Claims<T>>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => Error::TokenExpired,
            _ => Error::InvalidToken(e.to_string()),
        })?;

        Ok(token_data.claims)
    }

    /// Verify a token and return the embedded user snapshot.
    pub fn parse<T: DeserializeOwned + Clone>(&self, token: &str) -> Result<T> {
        self.decode_claims(token).map(|claims| claims.user)
    }
}
