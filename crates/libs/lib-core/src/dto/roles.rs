//! # Role Data Transfer Objects
//!
//! Bodies for `POST /api/user-roles/add` and `POST /api/user-roles/remove`.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Role to grant to, or revoke from, the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleRequest {
    pub role_id: String,
}

impl RoleRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        lib_utils::validate_not_empty(&self.role_id, "role_id")
            .map_err(|message| AppError::validation("role_id", message))
    }
}
