//! # Authentication Handlers
//!
//! HTTP request handlers for the account and verification endpoints.
//!
//! ## Overview
//!
//! - Sign-up with email, password and confirmation
//! - Verification code request and redemption
//! - Sign-in with email and password
//! - Profile lookup and profile completion with role reconciliation
//!
//! Bodies are validated here, before any service runs; every failure is an
//! [`AppError`] rendered as `{error, field, tag, code}`.

use axum::{
    extract::{rejection::JsonRejection, Extension, Json, State},
    http::StatusCode,
};
use chrono::Utc;
use lib_core::dto::auth::{
    CheckVerifyCodeRequest, MessageResponse, SendVerifyCodeRequest, SignInRequest, SignUpRequest,
    TokenResponse, UpdateProfileRequest,
};
use lib_core::model::models::PublicUser;
use lib_core::AppError;
use tracing::{info, instrument};

use crate::services::{AccountService, RoleAssignmentService, VerificationService};

/// `POST /api/auth/sign-up`
///
/// * `201 Created` - account stored with the approved default role
/// * `400` - invalid email or password, passwords differ
/// * `409` - email already registered
#[instrument(skip_all)]
pub async fn sign_up(
    State(account): State<AccountService>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let user = account.sign_up(&req.email, &req.password, &req.password_confirm).await?;
    info!("[SIGNUP] User {} registered", user.id);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully")),
    ))
}

/// `POST /api/auth/send-verify-code`
///
/// Credentials are checked before a code is generated and mailed.
#[instrument(skip_all)]
pub async fn send_verify_code(
    State(verification): State<VerificationService>,
    payload: Result<Json<SendVerifyCodeRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    verification.request_code(&req.email, &req.password).await?;

    Ok(Json(MessageResponse::new("Verify code sent")))
}

/// `POST /api/auth/check-verify-code`
///
/// Marks the account verified and answers with a fresh token.
#[instrument(skip_all)]
pub async fn check_verify_code(
    State(verification): State<VerificationService>,
    payload: Result<Json<CheckVerifyCodeRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let token = verification
        .redeem_code(&req.email, &req.password, &req.verify_code)
        .await?;

    Ok(Json(TokenResponse { token }))
}

/// `POST /api/auth/sign-in`
///
/// * `200 OK` - `{token}`
/// * `401` - wrong password or unverified email
/// * `404` - unknown email
#[instrument(skip_all)]
pub async fn sign_in(
    State(account): State<AccountService>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let token = account.sign_in(&req.email, &req.password).await?;

    Ok(Json(TokenResponse { token }))
}

/// `GET /api/auth/profile`
///
/// Reads the stored user, so it reflects changes made after the token was
/// issued.
pub async fn profile(
    State(account): State<AccountService>,
    Extension(user): Extension<PublicUser>,
) -> Result<Json<PublicUser>, AppError> {
    Ok(Json(account.get_profile(&user.id).await?))
}

/// `POST /api/auth/update-profile`
///
/// Stores the profile, reconciles the caller's roles against `role_ids` and
/// answers with a token carrying the new memberships.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_profile(
    State(roles): State<RoleAssignmentService>,
    Extension(user): Extension<PublicUser>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(req) = payload?;
    let profile = req.to_profile(Utc::now().date_naive())?;

    let token = roles.reconcile_roles(&user.id, &req.role_ids, profile).await?;
    info!("[ROLES] Profile completed for {}", user.id);

    Ok(Json(TokenResponse { token }))
}

#[cfg(test)]
mod tests;
