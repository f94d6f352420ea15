//! # Authentication Errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the credential and token primitives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The password hashing primitive failed (or rejected the input).
    #[error("Failed to hash password: {0}")]
    Hashing(String),

    /// The stored hash is not a valid PHC string.
    ///
    /// Callers treat this as a wrong password.
    #[error("Failed to parse hash: {0}")]
    Comparison(String),

    /// Token signing failed, e.g. the signing key is missing.
    #[error("Failed to sign token: {0}")]
    Signing(String),

    /// Signature mismatch, wrong algorithm or malformed token.
    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    /// The token is well formed but past its expiry.
    #[error("Access token expired")]
    TokenExpired,
}
