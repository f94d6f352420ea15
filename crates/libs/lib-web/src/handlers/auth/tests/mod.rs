//! # Auth Handler Tests
//!
//! Endpoint tests driven through the full router.


use axum::http::{Method, StatusCode};
use lib_core::dto::auth::{ErrorResponse, MessageResponse, TokenResponse};
use lib_core::model::models::PublicUser;
use serde_json::json;

use crate::handlers::testing::{read_json, send, setup_app, sign_in_token};
use crate::services::testing::{insert_user, role_id};

/// Strong enough for sign-up.
pub const PASSWORD: &str = "Secret123!";
