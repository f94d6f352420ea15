//! # HTTP Request Handlers
//!
//! Axum handlers organized by feature. Handlers validate request bodies and
//! delegate to the services in [`crate::services`].
//!
//! ## Handler Modules
//!
//! - **[`auth`]**: account and verification endpoints
//!   - `POST /api/auth/sign-up`
//!   - `POST /api/auth/send-verify-code`
//!   - `POST /api/auth/check-verify-code`
//!   - `POST /api/auth/sign-in`
//!   - `GET /api/auth/profile` (token)
//!   - `POST /api/auth/update-profile` (token)
//!
//! - **[`roles`]**: role catalog and single grants
//!   - `GET /api/roles`, `GET /api/roles/{id}`
//!   - `POST /api/user-roles/add`, `POST /api/user-roles/remove` (token)
//!
//! - **[`checks`]**: token and role-gate probes
//!   - `GET /api/check` (token)
//!   - `GET /api/check-user`, `/api/check-specialist`, `/api/check-minion`
//!     (token + approved role)
//!
//! ## Authentication
//!
//! Protected handlers extract `Extension<PublicUser>`, inserted by
//! [`require_auth`](crate::middleware::require_auth).
//!
//! ## Error Handling
//!
//! Handlers return `Result<T, AppError>`. Malformed JSON bodies are taken as
//! `Result<Json<T>, JsonRejection>` so the rejection becomes a `Validation`
//! error on field `body`:
//!
//! ```rust,ignore
//! async fn handler(
//!     State(account): State<AccountService>,
//!     payload: Result<Json<SignInRequest>, JsonRejection>,
//! ) -> Result<Json<TokenResponse>, AppError> {
//!     let Json(req) = payload?;
//!     req.validate()?;
//!     // ...
//! }
//! ```

pub mod auth;
pub mod checks;
pub mod roles;

#[cfg(test)]
pub(crate) mod testing;
