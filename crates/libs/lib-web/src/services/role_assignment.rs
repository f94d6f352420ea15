//! # Role Assignment Service
//!
//! Grants, revokes and reconciles a user's role assignments.
//!
//! ## Reconciliation
//!
//! [`RoleAssignmentService::reconcile_roles`] takes the complete desired set of
//! non-default role ids and brings the user's assignment records in line with it:
//!
//! ```text
//! current: { A: default/approved, B: pending }    desired: [B, C]
//!   keep A (default)  keep B  create C (pending)  delete nothing
//!
//! current: { A: default/approved, B: pending }    desired: []
//!   keep A (default)  delete B
//! ```
//!
//! The default role is always retained (and re-granted as approved if it has
//! gone missing); a default id in the desired set is ignored. Canceled
//! assignments are never retained: a desired role whose only record is
//! canceled gets a fresh pending one and the canceled record is deleted.
//! Unknown desired ids are rejected before anything is written. The writes are
//! not atomic: a crash between them can leave orphaned assignments or dangling
//! ids.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use lib_core::model::models::{
    AssignmentStatus, Profile, PublicUser, Role, RoleAssignment, RoleName, User,
};
use lib_core::{AppError, Stores};
use tracing::{debug, error, info, instrument, warn};

use super::session::TokenIssuer;

#[derive(Clone)]
pub struct RoleAssignmentService {
    stores: Stores,
    tokens: TokenIssuer,
}

impl RoleAssignmentService {
    pub fn new(stores: Stores, tokens: TokenIssuer) -> Self {
        Self { stores, tokens }
    }

    // region: --- Catalog

    pub async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        Ok(self.stores.roles.get_roles().await?)
    }

    pub async fn get_role(&self, role_id: &str) -> Result<Role, AppError> {
        self.stores
            .roles
            .get_role_by_id(role_id)
            .await?
            .ok_or(AppError::RoleNotFound)
    }

    // endregion: --- Catalog

    // region: --- Single grants

    /// Request `role_id` for the user as a pending assignment. A canceled
    /// assignment of the same role does not block a new request.
    #[instrument(skip(self))]
    pub async fn add_role(&self, user_id: &str, role_id: &str) -> Result<PublicUser, AppError> {
        let (mut user, role, current) = self.load(user_id, role_id).await?;

        if current.iter().any(|a| a.role_id == role.id && a.is_active()) {
            warn!("[ROLES] Role {} already assigned to {}", role.name, user.id);
            return Err(AppError::RoleAlreadyAssigned);
        }

        let assignment = RoleAssignment::new(&user.id, &role.id, AssignmentStatus::Pending);
        self.stores.assignments.create_role_assignment(&assignment).await?;
        user.role_assignment_ids.push(assignment.id.clone());
        user.updated_at = Utc::now();
        self.stores.users.update_user(&user).await?;

        info!("[ROLES] Role {} requested by {}", role.name, user.id);
        self.tokens.public_user(&user).await
    }

    /// Delete every assignment of `role_id` owned by the user.
    #[instrument(skip(self))]
    pub async fn remove_role(&self, user_id: &str, role_id: &str) -> Result<PublicUser, AppError> {
        let (mut user, role, current) = self.load(user_id, role_id).await?;

        let doomed: HashSet<String> = current
            .iter()
            .filter(|a| a.role_id == role.id)
            .map(|a| a.id.clone())
            .collect();

        if doomed.is_empty() {
            warn!("[ROLES] Role {} not assigned to {}", role.name, user.id);
            return Err(AppError::RoleNotAssigned);
        }

        self.delete_assignments(doomed.iter()).await?;

        user.role_assignment_ids.retain(|id| !doomed.contains(id));
        user.updated_at = Utc::now();
        self.stores.users.update_user(&user).await?;

        info!("[ROLES] Role {} removed from {}", role.name, user.id);
        self.tokens.public_user(&user).await
    }

    async fn load(
        &self,
        user_id: &str,
        role_id: &str,
    ) -> Result<(User, Role, Vec<RoleAssignment>), AppError> {
        let user = self
            .stores
            .users
            .get_user_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        let role = self.get_role(role_id).await?;
        let current = self
            .stores
            .assignments
            .get_role_assignments_by_ids(&user.role_assignment_ids)
            .await?;

        Ok((user, role, current))
    }

    // endregion: --- Single grants

    // region: --- Reconciliation

    /// Apply `profile`, reconcile assignments against `desired_role_ids` and
    /// return a fresh token.
    #[instrument(skip(self, profile))]
    pub async fn reconcile_roles(
        &self,
        user_id: &str,
        desired_role_ids: &[String],
        profile: Profile,
    ) -> Result<String, AppError> {
        let mut user = self
            .stores
            .users
            .get_user_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let default_role = self
            .stores
            .roles
            .get_role_by_name(RoleName::User)
            .await?
            .ok_or(AppError::RoleNotFound)?;

        let mut seen = HashSet::new();
        let desired: Vec<String> = desired_role_ids
            .iter()
            .filter(|id| **id != default_role.id)
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        let known = self.stores.roles.get_roles_by_ids(&desired).await?;
        if known.len() != desired.len() {
            warn!("[ROLES] Unknown role id in desired set for {}", user.id);
            return Err(AppError::RoleNotFound);
        }

        let current = self
            .stores
            .assignments
            .get_role_assignments_by_ids(&user.role_assignment_ids)
            .await?;

        let mut by_role: HashMap<&str, &RoleAssignment> = HashMap::new();
        for assignment in current.iter().filter(|a| a.is_active()) {
            by_role.entry(assignment.role_id.as_str()).or_insert(assignment);
        }

        let mut retained: Vec<String> = Vec::with_capacity(desired.len() + 1);

        match by_role.get(default_role.id.as_str()) {
            Some(assignment) => retained.push(assignment.id.clone()),
            None => {
                let grant = RoleAssignment::new(&user.id, &default_role.id, AssignmentStatus::Approved);
                self.stores.assignments.create_role_assignment(&grant).await?;
                info!("[ROLES] Default role re-granted to {}", user.id);
                retained.push(grant.id);
            }
        }

        for role_id in &desired {
            match by_role.get(role_id.as_str()) {
                Some(assignment) => retained.push(assignment.id.clone()),
                None => {
                    let request = RoleAssignment::new(&user.id, role_id, AssignmentStatus::Pending);
                    self.stores.assignments.create_role_assignment(&request).await?;
                    debug!("[ROLES] Pending assignment {} created", request.id);
                    retained.push(request.id);
                }
            }
        }

        let keep: HashSet<&str> = retained.iter().map(String::as_str).collect();
        self.delete_assignments(
            current
                .iter()
                .map(|a| &a.id)
                .filter(|id| !keep.contains(id.as_str())),
        )
        .await?;

        user.profile = profile;
        user.finished_registration = true;
        user.role_assignment_ids = retained;
        user.updated_at = Utc::now();
        self.stores.users.update_user(&user).await.map_err(|e| {
            error!("[ROLES] Failed to save user {}: {}", user.id, e);
            AppError::ProfileUpdateFailed(e.to_string())
        })?;

        info!(
            "[ROLES] Reconciled {} with {} assignment(s)",
            user.id,
            user.role_assignment_ids.len()
        );
        self.tokens.issue(&user).await
    }

    // endregion: --- Reconciliation

    async fn delete_assignments<'a>(
        &self,
        ids: impl Iterator<Item = &'a String>,
    ) -> Result<(), AppError> {
        for id in ids {
            self.stores
                .assignments
                .delete_role_assignment_by_id(id)
                .await
                .map_err(|e| {
                    error!("[ROLES] Failed to delete assignment {}: {}", id, e);
                    AppError::AssignmentDeletionFailed(e.to_string())
                })?;
            debug!("[ROLES] Assignment {} deleted", id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{
        insert_user, role_id, setup, setup_with_failing_deletes, setup_with_failing_updates,
        TestContext,
    };

    const PASSWORD: &str = "Secret123!";

    async fn assignments_of(ctx: &TestContext, user_id: &str) -> Vec<RoleAssignment> {
        let user = ctx.stores.users.get_user_by_id(user_id).await.unwrap().unwrap();
        ctx.stores
            .assignments
            .get_role_assignments_by_ids(&user.role_assignment_ids)
            .await
            .unwrap()
    }

    async fn attach(
        ctx: &TestContext,
        user_id: &str,
        role_id: &str,
        status: AssignmentStatus,
    ) -> RoleAssignment {
        let mut user = ctx.stores.users.get_user_by_id(user_id).await.unwrap().unwrap();
        let assignment = RoleAssignment::new(user_id, role_id, status);
        ctx.stores.assignments.create_role_assignment(&assignment).await.unwrap();
        user.role_assignment_ids.push(assignment.id.clone());
        ctx.stores.users.update_user(&user).await.unwrap();
        assignment
    }

    // ========== AddRole / RemoveRole Tests ==========

    #[tokio::test]
    async fn test_add_role_creates_pending_assignment() {
        let ctx = setup().await;
        let user = insert_user(&ctx, "alice@example.com", PASSWORD, true).await;
        let minion = role_id(&ctx, RoleName::Minion);

        let public = ctx.roles.add_role(&user.id, &minion).await.unwrap();

        assert_eq!(public.role_names(), vec![RoleName::User, RoleName::Minion]);
        assert!(!public.has_approved_role(RoleName::Minion));
        let stored = assignments_of(&ctx, &user.id).await;
        assert_eq!(stored[1].status, AssignmentStatus::Pending);
    }

    #[tokio::test]
    async fn test_add_role_twice_is_conflict() {
        let ctx = setup().await;
        let user = insert_user(&ctx, "alice@example.com", PASSWORD, true).await;
        let specialist = role_id(&ctx, RoleName::Specialist);
        ctx.roles.add_role(&user.id, &specialist).await.unwrap();

        let result = ctx.roles.add_role(&user.id, &specialist).await;

        assert_eq!(result.unwrap_err(), AppError::RoleAlreadyAssigned);
    }

    #[tokio::test]
    async fn test_add_role_after_cancellation() {
        let ctx = setup().await;
        let user = insert_user(&ctx, "alice@example.com", PASSWORD, true).await;
        let minion = role_id(&ctx, RoleName::Minion);
        let canceled = attach(&ctx, &user.id, &minion, AssignmentStatus::Canceled).await;

        let public = ctx.roles.add_role(&user.id, &minion).await.unwrap();

        assert_eq!(public.role_assignment_ids.len(), 3);
        let stored = assignments_of(&ctx, &user.id).await;
        assert_eq!(stored[1].id, canceled.id);
        assert_eq!(stored[1].status, AssignmentStatus::Canceled);
        assert_eq!(stored[2].role_id, minion);
        assert_eq!(stored[2].status, AssignmentStatus::Pending);
        assert_eq!(
            ctx.roles.add_role(&user.id, &minion).await.unwrap_err(),
            AppError::RoleAlreadyAssigned
        );
    }

    #[tokio::test]
    async fn test_add_role_unknown_user_or_role() {
        let ctx = setup().await;
        let user = insert_user(&ctx, "alice@example.com", PASSWORD, true).await;

        assert_eq!(
            ctx.roles.add_role("missing", &role_id(&ctx, RoleName::Minion)).await.unwrap_err(),
            AppError::UserNotFound
        );
        assert_eq!(
            ctx.roles.add_role(&user.id, "missing").await.unwrap_err(),
            AppError::RoleNotFound
        );
    }

    #[tokio::test]
    async fn test_remove_role() {
        let ctx = setup().await;
        let user = insert_user(&ctx, "alice@example.com", PASSWORD, true).await;
        let minion = role_id(&ctx, RoleName::Minion);
        ctx.roles.add_role(&user.id, &minion).await.unwrap();

        let public = ctx.roles.remove_role(&user.id, &minion).await.unwrap();

        assert_eq!(public.role_names(), vec![RoleName::User]);
        assert_eq!(public.role_assignment_ids.len(), 1);
        assert_eq!(
            ctx.roles.remove_role(&user.id, &minion).await.unwrap_err(),
            AppError::RoleNotAssigned
        );
    }

    #[tokio::test]
    async fn test_remove_role_deletes_every_duplicate() {
        let ctx = setup().await;
        let mut user = insert_user(&ctx, "alice@example.com", PASSWORD, true).await;
        let minion = role_id(&ctx, RoleName::Minion);
        for _ in 0..2 {
            let dup = RoleAssignment::new(&user.id, &minion, AssignmentStatus::Pending);
            ctx.stores.assignments.create_role_assignment(&dup).await.unwrap();
            user.role_assignment_ids.push(dup.id);
        }
        ctx.stores.users.update_user(&user).await.unwrap();

        let public = ctx.roles.remove_role(&user.id, &minion).await.unwrap();

        assert_eq!(public.role_names(), vec![RoleName::User]);
        assert_eq!(assignments_of(&ctx, &user.id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_role_deletion_failure() {
        let ctx = setup_with_failing_deletes().await;
        let user = insert_user(&ctx, "alice@example.com", PASSWORD, true).await;
        let minion = role_id(&ctx, RoleName::Minion);
        ctx.roles.add_role(&user.id, &minion).await.unwrap();

        let result = ctx.roles.remove_role(&user.id, &minion).await;

        assert!(matches!(result, Err(AppError::AssignmentDeletionFailed(_))));
        assert_eq!(assignments_of(&ctx, &user.id).await.len(), 2);
    }

    // ========== ReconcileRoles Tests ==========

    #[tokio::test]
    async fn test_reconcile_keeps_existing_and_adds_new() {
        let ctx = setup().await;
        let user = insert_user(&ctx, "alice@example.com", PASSWORD, true).await;
        let specialist = role_id(&ctx, RoleName::Specialist);
        let minion = role_id(&ctx, RoleName::Minion);
        ctx.roles.add_role(&user.id, &specialist).await.unwrap();
        let before = assignments_of(&ctx, &user.id).await;

        let token = ctx
            .roles
            .reconcile_roles(&user.id, &[specialist.clone(), minion.clone()], Profile::default())
            .await
            .unwrap();

        let after = assignments_of(&ctx, &user.id).await;
        assert_eq!(after.len(), 3);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[1], before[1]);
        assert_eq!(after[2].role_id, minion);
        assert_eq!(after[2].status, AssignmentStatus::Pending);

        let snapshot = ctx.tokens.parse(&token).unwrap();
        assert_eq!(
            snapshot.role_names(),
            vec![RoleName::User, RoleName::Specialist, RoleName::Minion]
        );
        assert!(snapshot.finished_registration);
    }

    #[tokio::test]
    async fn test_reconcile_empty_set_keeps_only_default() {
        let ctx = setup().await;
        let user = insert_user(&ctx, "alice@example.com", PASSWORD, true).await;
        let specialist = role_id(&ctx, RoleName::Specialist);
        ctx.roles.add_role(&user.id, &specialist).await.unwrap();
        let before = assignments_of(&ctx, &user.id).await;

        let token = ctx.roles.reconcile_roles(&user.id, &[], Profile::default()).await.unwrap();

        let after = assignments_of(&ctx, &user.id).await;
        assert_eq!(after, vec![before[0].clone()]);
        let removed = ctx
            .stores
            .assignments
            .get_role_assignments_by_ids(&[before[1].id.clone()])
            .await
            .unwrap();
        assert!(removed.is_empty());
        assert_eq!(ctx.tokens.parse(&token).unwrap().role_names(), vec![RoleName::User]);
    }

    #[tokio::test]
    async fn test_reconcile_ignores_default_and_duplicates() {
        let ctx = setup().await;
        let user = insert_user(&ctx, "alice@example.com", PASSWORD, true).await;
        let default = role_id(&ctx, RoleName::User);
        let minion = role_id(&ctx, RoleName::Minion);

        ctx.roles
            .reconcile_roles(
                &user.id,
                &[default.clone(), minion.clone(), minion.clone()],
                Profile::default(),
            )
            .await
            .unwrap();

        let after = assignments_of(&ctx, &user.id).await;
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].role_id, default);
        assert_eq!(after[0].status, AssignmentStatus::Approved);
        assert_eq!(after[1].role_id, minion);
    }

    #[tokio::test]
    async fn test_reconcile_replaces_canceled_assignment() {
        let ctx = setup().await;
        let user = insert_user(&ctx, "alice@example.com", PASSWORD, true).await;
        let minion = role_id(&ctx, RoleName::Minion);
        let canceled = attach(&ctx, &user.id, &minion, AssignmentStatus::Canceled).await;

        ctx.roles
            .reconcile_roles(&user.id, &[minion.clone()], Profile::default())
            .await
            .unwrap();

        let after = assignments_of(&ctx, &user.id).await;
        assert_eq!(after.len(), 2);
        assert_eq!(after[1].role_id, minion);
        assert_eq!(after[1].status, AssignmentStatus::Pending);
        assert_ne!(after[1].id, canceled.id);
        let removed = ctx
            .stores
            .assignments
            .get_role_assignments_by_ids(&[canceled.id])
            .await
            .unwrap();
        assert!(removed.is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_regrants_missing_default() {
        let ctx = setup().await;
        let mut user = insert_user(&ctx, "alice@example.com", PASSWORD, true).await;
        user.role_assignment_ids.clear();
        ctx.stores.users.update_user(&user).await.unwrap();

        let token = ctx.roles.reconcile_roles(&user.id, &[], Profile::default()).await.unwrap();

        assert!(ctx.tokens.parse(&token).unwrap().has_approved_role(RoleName::User));
    }

    #[tokio::test]
    async fn test_reconcile_unknown_role_mutates_nothing() {
        let ctx = setup().await;
        let user = insert_user(&ctx, "alice@example.com", PASSWORD, true).await;
        let before = ctx.stores.users.get_user_by_id(&user.id).await.unwrap().unwrap();

        let result = ctx
            .roles
            .reconcile_roles(
                &user.id,
                &[role_id(&ctx, RoleName::Minion), "missing".to_string()],
                Profile::default(),
            )
            .await;

        assert_eq!(result.unwrap_err(), AppError::RoleNotFound);
        let after = ctx.stores.users.get_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_reconcile_applies_profile() {
        let ctx = setup().await;
        let user = insert_user(&ctx, "alice@example.com", PASSWORD, true).await;
        let profile = Profile {
            name: Some("Alice".to_string()),
            iin: Some("900101300123".to_string()),
            ..Profile::default()
        };

        ctx.roles.reconcile_roles(&user.id, &[], profile.clone()).await.unwrap();

        let stored = ctx.stores.users.get_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.profile, profile);
        assert!(stored.finished_registration);
    }

    #[tokio::test]
    async fn test_reconcile_deletion_failure_is_fatal() {
        let ctx = setup_with_failing_deletes().await;
        let user = insert_user(&ctx, "alice@example.com", PASSWORD, true).await;
        ctx.roles.add_role(&user.id, &role_id(&ctx, RoleName::Minion)).await.unwrap();

        let result = ctx.roles.reconcile_roles(&user.id, &[], Profile::default()).await;

        assert!(matches!(result, Err(AppError::AssignmentDeletionFailed(_))));
        let stored = ctx.stores.users.get_user_by_id(&user.id).await.unwrap().unwrap();
        assert!(!stored.finished_registration);
    }

    #[tokio::test]
    async fn test_reconcile_save_failure() {
        let ctx = setup_with_failing_updates().await;
        let user = insert_user(&ctx, "alice@example.com", PASSWORD, true).await;

        let result = ctx.roles.reconcile_roles(&user.id, &[], Profile::default()).await;

        assert!(matches!(result, Err(AppError::ProfileUpdateFailed(_))));
    }

    #[tokio::test]
    async fn test_reconcile_unknown_user() {
        let ctx = setup().await;

        let result = ctx.roles.reconcile_roles("missing", &[], Profile::default()).await;

        assert_eq!(result.unwrap_err(), AppError::UserNotFound);
    }

    #[tokio::test]
    async fn test_catalog_lookups() {
        let ctx = setup().await;

        assert_eq!(ctx.roles.list_roles().await.unwrap().len(), 3);
        let minion = ctx.roles.get_role(&role_id(&ctx, RoleName::Minion)).await.unwrap();
        assert_eq!(minion.name, RoleName::Minion);
        assert_eq!(ctx.roles.get_role("missing").await.unwrap_err(), AppError::RoleNotFound);
    }
}
