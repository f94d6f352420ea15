//! # Centralized Error Handling
//!
//! This module defines the application-wide error type [`AppError`] returned by
//! every core operation. Errors are plain values: each carries a human message,
//! the name of the offending field, and an [`ErrorCategory`] tag the transport
//! maps to a status code.
//!
//! ## Error Categories
//!
//! 1. **not-found** → 404 (`UserNotFound`, `RoleNotFound`, `RoleNotAssigned`)
//! 2. **conflict** → 409 (`UserAlreadyExists`, `RoleAlreadyAssigned`)
//! 3. **validation** → 400 (`Validation`)
//! 4. **auth** → 401, or 403 for `Forbidden` (credentials, codes, tokens)
//! 5. **dependency-failure** → 500 (store, hashing, signing, config)
//!
//! The core never retries; every failure goes straight back to the caller.
//!
//! ## Error Conversion
//!
//! - `From<lib_auth::Error>` - credential/token primitive failures
//! - `From<StoreError>` - store collaborator failures
//! - `From<JsonRejection>` - malformed request bodies
//! - `From<anyhow::Error>` - anything else, as `Internal`

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::model::store::StoreError;

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Coarse classification used by callers to pick a transport outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Conflict,
    Validation,
    Auth,
    DependencyFailure,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::NotFound => "not-found",
            ErrorCategory::Conflict => "conflict",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Auth => "auth",
            ErrorCategory::DependencyFailure => "dependency-failure",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-wide error type covering all error scenarios.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AppError {
    #[error("User not found")]
    UserNotFound,

    #[error("Role not found")]
    RoleNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("This role already exists for the user")]
    RoleAlreadyAssigned,

    #[error("This role does not exist for the user")]
    RoleNotAssigned,

    /// Unknown email/password combination. Also used when the stored hash
    /// cannot be parsed.
    #[error("Email or password is wrong")]
    InvalidCredentials,

    #[error("Verify code is invalid")]
    CodeMismatch,

    /// The account exists but its email has not been verified yet.
    #[error("User is unauthorized: email is not verified")]
    Unverified,

    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    #[error("Access token expired")]
    TokenExpired,

    /// Authenticated, but lacking an approved membership of the named role.
    #[error("User is unauthorized for role {0}")]
    Forbidden(String),

    /// Malformed input, caught before reaching the core.
    #[error("{message}")]
    Validation { field: String, message: String },

    /// Deleting a stale role assignment failed; the whole operation is aborted.
    #[error("Can't delete role assignment: {0}")]
    AssignmentDeletionFailed(String),

    /// The user record could not be saved at the end of a reconciliation.
    #[error("Can't update user: {0}")]
    ProfileUpdateFailed(String),

    #[error("Failed to hash password: {0}")]
    Hashing(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a validation failure on `field`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::UserNotFound | AppError::RoleNotFound | AppError::RoleNotAssigned => {
                ErrorCategory::NotFound
            }
            AppError::UserAlreadyExists | AppError::RoleAlreadyAssigned => ErrorCategory::Conflict,
            AppError::Validation { .. } => ErrorCategory::Validation,
            AppError::InvalidCredentials
            | AppError::CodeMismatch
            | AppError::Unverified
            | AppError::InvalidToken(_)
            | AppError::TokenExpired
            | AppError::Forbidden(_) => ErrorCategory::Auth,
            AppError::AssignmentDeletionFailed(_)
            | AppError::ProfileUpdateFailed(_)
            | AppError::Hashing(_)
            | AppError::Signing(_)
            | AppError::Store(_)
            | AppError::Config(_)
            | AppError::Internal(_) => ErrorCategory::DependencyFailure,
        }
    }

    /// Name of the input field (or resource) the error is about.
    pub fn field(&self) -> &str {
        match self {
            AppError::UserNotFound => "user",
            AppError::RoleNotFound
            | AppError::RoleAlreadyAssigned
            | AppError::RoleNotAssigned
            | AppError::AssignmentDeletionFailed(_) => "role_id",
            AppError::UserAlreadyExists | AppError::Unverified => "email",
            AppError::InvalidCredentials => "email/password",
            AppError::CodeMismatch => "verify_code",
            AppError::InvalidToken(_) | AppError::TokenExpired | AppError::Signing(_) => "token",
            AppError::Forbidden(_) => "role",
            AppError::Validation { field, .. } => field,
            AppError::ProfileUpdateFailed(_) => "user_id",
            AppError::Hashing(_) => "password",
            AppError::Store(_) => "store",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }

    /// Variant name, used as a stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::UserNotFound => "UserNotFound",
            AppError::RoleNotFound => "RoleNotFound",
            AppError::UserAlreadyExists => "UserAlreadyExists",
            AppError::RoleAlreadyAssigned => "RoleAlreadyAssigned",
            AppError::RoleNotAssigned => "RoleNotAssigned",
            AppError::InvalidCredentials => "InvalidCredentials",
            AppError::CodeMismatch => "CodeMismatch",
            AppError::Unverified => "Unverified",
            AppError::InvalidToken(_) => "InvalidToken",
            AppError::TokenExpired => "TokenExpired",
            AppError::Forbidden(_) => "Forbidden",
            AppError::Validation { .. } => "Validation",
            AppError::AssignmentDeletionFailed(_) => "AssignmentDeletionFailed",
            AppError::ProfileUpdateFailed(_) => "ProfileUpdateFailed",
            AppError::Hashing(_) => "Hashing",
            AppError::Signing(_) => "Signing",
            AppError::Store(_) => "Store",
            AppError::Config(_) => "Config",
            AppError::Internal(_) => "Internal",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.category() {
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Conflict => StatusCode::CONFLICT,
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::Auth => match self {
                AppError::Forbidden(_) => StatusCode::FORBIDDEN,
                _ => StatusCode::UNAUTHORIZED,
            },
            ErrorCategory::DependencyFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message.
    ///
    /// Dependency failures return a generic message to avoid exposing
    /// implementation details.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidToken(_) => "Invalid access token".to_string(),
            AppError::AssignmentDeletionFailed(_) => "Can't delete role assignment".to_string(),
            AppError::ProfileUpdateFailed(_) => "Can't update user".to_string(),
            _ if self.category() == ErrorCategory::DependencyFailure => {
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Implement Axum's `IntoResponse` for automatic error handling.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log error details (full error message for server logs)
        if status.is_server_error() {
            tracing::error!(code = self.code(), field = self.field(), "Server error: {}", self);
        } else {
            tracing::debug!(code = self.code(), field = self.field(), "Client error: {}", self);
        }

        let body = Json(json!({
            "error": self.user_message(),
            "field": self.field(),
            "tag": self.category().as_str(),
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

impl From<lib_auth::Error> for AppError {
    fn from(err: lib_auth::Error) -> Self {
        match err {
            lib_auth::Error::Hashing(msg) => AppError::Hashing(msg),
            lib_auth::Error::Comparison(_) => AppError::InvalidCredentials,
            lib_auth::Error::Signing(msg) => AppError::Signing(msg),
            lib_auth::Error::InvalidToken(msg) => AppError::InvalidToken(msg),
            lib_auth::Error::TokenExpired => AppError::TokenExpired,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation("body", rejection.body_text())
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
