//! # Token Check Handlers
//!
//! `GET /api/check` echoes the snapshot carried by the token. The
//! `check-user`, `check-specialist` and `check-minion` routes share
//! [`check_role`] behind the role gate.

use axum::extract::{Extension, Json};
use lib_core::dto::auth::MessageResponse;
use lib_core::model::models::PublicUser;

pub async fn check(Extension(user): Extension<PublicUser>) -> Json<PublicUser> {
    Json(user)
}

pub async fn check_role(Extension(user): Extension<PublicUser>) -> Json<MessageResponse> {
    Json(MessageResponse::new(format!("Access granted for {}", user.email)))
}
