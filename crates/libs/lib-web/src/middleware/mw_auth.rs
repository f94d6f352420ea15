//! # Authentication Middleware
//!
//! Validates the access token and injects the embedded [`PublicUser`]
//! snapshot into the request extensions.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use axum::{middleware::from_fn_with_state, routing::get, Router};
//! use lib_web::middleware::require_auth;
//!
//! let app = Router::new()
//!     .route("/api/auth/profile", get(profile))
//!     .route_layer(from_fn_with_state(tokens, require_auth));
//! ```
//!
//! Handlers then extract the snapshot with `Extension<PublicUser>`:
//!
//! ```rust,ignore
//! use axum::extract::Extension;
//! use lib_core::model::models::PublicUser;
//!
//! async fn profile(Extension(user): Extension<PublicUser>) -> String {
//!     format!("Hello, {}!", user.email)
//! }
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use lib_core::AppError;
use tracing::{debug, warn};

use crate::services::TokenIssuer;

/// Token from an `Authorization` header value. Both `Bearer <token>` and a
/// bare token are accepted.
pub fn extract_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    (!token.is_empty()).then_some(token)
}

/// Authentication middleware.
///
/// - **Valid token**: continues with `PublicUser` in the extensions
/// - **Missing/invalid/expired token**: `401 Unauthorized` with the error body
pub async fn require_auth(
    State(tokens): State<TokenIssuer>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_token)
        .ok_or_else(|| {
            warn!("[AUTH] Missing Authorization header");
            AppError::InvalidToken("missing access token".to_string())
        })?;

    let user = tokens.parse(token).inspect_err(|e| {
        warn!("[AUTH] Token validation failed: {}", e);
    })?;

    debug!("[AUTH] Authenticated user: {} (id: {})", user.email, user.id);

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
