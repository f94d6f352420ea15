//! # Role Gate Middleware
//!
//! Lets a request through only when the authenticated snapshot holds an
//! `approved` membership of the configured role. Must run after
//! [`require_auth`](super::require_auth).
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/api/check-minion", get(check_role))
//!     .route_layer(from_fn_with_state(RoleName::Minion, require_role));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use lib_core::model::models::{PublicUser, RoleName};
use lib_core::AppError;
use tracing::{debug, warn};

pub async fn require_role(
    State(role): State<RoleName>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<PublicUser>()
        .ok_or_else(|| AppError::InvalidToken("missing access token".to_string()))?;

    if !user.has_approved_role(role) {
        warn!("[ROLES] User {} lacks approved role {}", user.id, role);
        return Err(AppError::Forbidden(role.to_string()));
    }

    debug!("[ROLES] User {} passed {} gate", user.id, role);
    Ok(next.run(req).await)
}
