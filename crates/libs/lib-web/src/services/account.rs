//! # Account Service
//!
//! Registration, sign-in and profile lookup.
//!
//! A new account is created unverified and owns exactly one assignment: an
//! `approved` grant of the default role. Signing in requires a verified email.

use lib_auth::{hash_password, verify_password};
use lib_core::model::models::{AssignmentStatus, PublicUser, RoleAssignment, RoleName, User};
use lib_core::{AppError, StoreError, Stores, UserStore};
use tracing::{debug, error, info, instrument, warn};

use super::session::TokenIssuer;

/// Load the user by email and check the password.
///
/// An unparsable stored hash reads as a wrong password.
pub(crate) async fn authenticate(
    users: &dyn UserStore,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let user = users
        .get_user_by_email(email)
        .await?
        .ok_or(AppError::UserNotFound)?;

    match verify_password(password, &user.password_hash) {
        Ok(true) => Ok(user),
        Ok(false) => Err(AppError::InvalidCredentials),
        Err(e) => {
            warn!("[AUTH] Stored password hash unreadable for {}: {}", user.id, e);
            Err(AppError::InvalidCredentials)
        }
    }
}

#[derive(Clone)]
pub struct AccountService {
    stores: Stores,
    tokens: TokenIssuer,
}

impl AccountService {
    pub fn new(stores: Stores, tokens: TokenIssuer) -> Self {
        Self { stores, tokens }
    }

    #[instrument(skip(self, password, password_confirm))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<PublicUser, AppError> {
        info!("[SIGNUP] New signup request");

        if self.stores.users.get_user_by_email(email).await?.is_some() {
            warn!("[SIGNUP] Email already registered");
            return Err(AppError::UserAlreadyExists);
        }

        debug!("[SIGNUP] Hashing password...");
        let password_hash = hash_password(password)?;
        let password_confirm_hash = hash_password(password_confirm)?;

        let default_role = self
            .stores
            .roles
            .get_role_by_name(RoleName::User)
            .await?
            .ok_or(AppError::RoleNotFound)?;

        let mut user = User::new(email, password_hash, password_confirm_hash, Vec::new());
        let assignment = RoleAssignment::new(&user.id, &default_role.id, AssignmentStatus::Approved);
        self.stores.assignments.create_role_assignment(&assignment).await?;
        user.role_assignment_ids.push(assignment.id.clone());

        if let Err(e) = self.stores.users.create_user(&user).await {
            // The assignment must not outlive a user row that was never written
            if let Err(cleanup) = self.stores.assignments.delete_role_assignment_by_id(&assignment.id).await {
                error!("[SIGNUP] Failed to remove orphaned assignment {}: {}", assignment.id, cleanup);
            }
            return Err(match e {
                StoreError::Conflict(_) => AppError::UserAlreadyExists,
                other => other.into(),
            });
        }

        info!("[SIGNUP] User created: {}", user.id);
        self.tokens.public_user(&user).await
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = authenticate(self.stores.users.as_ref(), email, password).await?;

        if !user.verified {
            warn!("[SIGNIN] Email not verified for {}", user.id);
            return Err(AppError::Unverified);
        }

        info!("[SIGNIN] User authenticated: {}", user.id);
        self.tokens.issue(&user).await
    }

    /// Current stored state of the user, not the token snapshot.
    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: &str) -> Result<PublicUser, AppError> {
        let user = self
            .stores
            .users
            .get_user_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        self.tokens.public_user(&user).await
    }
}
