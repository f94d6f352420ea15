//! # Session Tokens
//!
//! Builds the sanitized [`PublicUser`] snapshot of a stored user and signs it
//! into an access token, or verifies a token and returns its snapshot.

use lib_auth::TokenService;
use lib_core::model::models::{PublicUser, User};
use lib_core::{AppError, Stores};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct TokenIssuer {
    stores: Stores,
    tokens: TokenService,
}

impl TokenIssuer {
    pub fn new(stores: Stores, tokens: TokenService) -> Self {
        Self { stores, tokens }
    }

    /// Resolve the user's assignments against the role catalog.
    pub async fn public_user(&self, user: &User) -> Result<PublicUser, AppError> {
        let assignments = self
            .stores
            .assignments
            .get_role_assignments_by_ids(&user.role_assignment_ids)
            .await?;
        let roles = self.stores.roles.get_roles().await?;

        Ok(PublicUser::from_user(user, &assignments, &roles))
    }

    /// Mint a token embedding the current snapshot of `user`.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn issue(&self, user: &User) -> Result<String, AppError> {
        let snapshot = self.public_user(user).await?;
        let token = self.tokens.issue(&snapshot)?;
        debug!("[AUTH] Token issued with {} role(s)", snapshot.roles.len());
        Ok(token)
    }

    /// Verify `token` and return the snapshot it carries.
    pub fn parse(&self, token: &str) -> Result<PublicUser, AppError> {
        Ok(self.tokens.parse::<PublicUser>(token)?)
    }
}
