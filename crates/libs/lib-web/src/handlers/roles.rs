//! # Role Handlers
//!
//! Role catalog lookups and single grants/revocations for the caller.
//!
//! - `GET /api/roles`, `GET /api/roles/{id}` - public catalog
//! - `POST /api/user-roles/add`, `POST /api/user-roles/remove` - token required

use axum::extract::{rejection::JsonRejection, Extension, Json, Path, State};
use lib_core::dto::roles::RoleRequest;
use lib_core::model::models::{PublicUser, Role};
use lib_core::AppError;
use tracing::instrument;

use crate::services::RoleAssignmentService;

pub async fn list_roles(State(roles): State<RoleAssignmentService>) -> Result<Json<Vec<Role>>, AppError> {
    Ok(Json(roles.list_roles().await?))
}

pub async fn get_role(
    State(roles): State<RoleAssignmentService>,
    Path(id): Path<String>,
) -> Result<Json<Role>, AppError> {
    Ok(Json(roles.get_role(&id).await?))
}

/// Grant `role_id` as `pending`; answers with the updated user.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn add_role(
    State(roles): State<RoleAssignmentService>,
    Extension(user): Extension<PublicUser>,
    payload: Result<Json<RoleRequest>, JsonRejection>,
) -> Result<Json<PublicUser>, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    Ok(Json(roles.add_role(&user.id, &req.role_id).await?))
}

/// Revoke every assignment of `role_id`; answers with the updated user.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn remove_role(
    State(roles): State<RoleAssignmentService>,
    Extension(user): Extension<PublicUser>,
    payload: Result<Json<RoleRequest>, JsonRejection>,
) -> Result<Json<PublicUser>, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    Ok(Json(roles.remove_role(&user.id, &req.role_id).await?))
}
