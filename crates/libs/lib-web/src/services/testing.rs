//! Shared fixtures for service and handler tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lib_auth::{hash_password, TokenConfig, TokenService};
use lib_core::model::models::{AssignmentStatus, Role, RoleAssignment, RoleName, User};
use lib_core::{
    create_memory_pool, seed_roles, RoleAssignmentStore, StoreError, StoreResult, Stores,
    UserStore,
};

use super::{AccountService, RoleAssignmentService, TokenIssuer, VerificationService};
use crate::notifier::testing::RecordingNotifier;

pub const TEST_SECRET: &str = "test-secret-key-must-be-at-least-32-characters-long!";

pub struct TestContext {
    pub stores: Stores,
    pub catalog: Vec<Role>,
    pub notifier: RecordingNotifier,
    pub tokens: TokenIssuer,
    pub account: AccountService,
    pub verification: VerificationService,
    pub roles: RoleAssignmentService,
}

pub fn token_service() -> TokenService {
    TokenService::new(TokenConfig::with_hours(TEST_SECRET, 24))
}

async fn sqlite_stores(seed: bool) -> Stores {
    let pool = create_memory_pool().await.expect("Failed to create test database");
    let stores = Stores::sqlite(pool);
    if seed {
        seed_roles(stores.roles.as_ref()).await.expect("Failed to seed roles");
    }
    stores
}

pub async fn context(stores: Stores) -> TestContext {
    let catalog = stores.roles.get_roles().await.expect("Failed to load roles");
    let notifier = RecordingNotifier::default();
    let tokens = TokenIssuer::new(stores.clone(), token_service());

    TestContext {
        account: AccountService::new(stores.clone(), tokens.clone()),
        verification: VerificationService::new(stores.clone(), tokens.clone(), Arc::new(notifier.clone())),
        roles: RoleAssignmentService::new(stores.clone(), tokens.clone()),
        stores,
        catalog,
        notifier,
        tokens,
    }
}

/// Seeded in-memory stores.
pub async fn setup() -> TestContext {
    context(sqlite_stores(true).await).await
}

/// In-memory stores with an empty role catalog.
pub async fn setup_unseeded() -> TestContext {
    context(sqlite_stores(false).await).await
}

pub async fn setup_with_failing_deletes() -> TestContext {
    let mut stores = sqlite_stores(true).await;
    stores.assignments = Arc::new(FailingDeletes(stores.assignments.clone()));
    context(stores).await
}

pub async fn setup_with_failing_updates() -> TestContext {
    let mut stores = sqlite_stores(true).await;
    stores.users = Arc::new(FailingUpdates(stores.users.clone()));
    context(stores).await
}

/// Stores where the sign-up email check always misses, so `create_user`
/// hits the unique constraint as a concurrent sign-up would. The returned list
/// collects every user passed to `create_user`.
pub async fn setup_with_racing_sign_ups() -> (TestContext, Arc<Mutex<Vec<User>>>) {
    let mut stores = sqlite_stores(true).await;
    let attempts = Arc::new(Mutex::new(Vec::new()));
    stores.users = Arc::new(RacingSignUps {
        inner: stores.users.clone(),
        attempts: attempts.clone(),
    });
    (context(stores).await, attempts)
}

pub fn role_id(ctx: &TestContext, name: RoleName) -> String {
    ctx.catalog
        .iter()
        .find(|r| r.name == name)
        .map(|r| r.id.clone())
        .expect("role should be seeded")
}

/// Store a user holding an approved default assignment.
pub async fn insert_user(ctx: &TestContext, email: &str, password: &str, verified: bool) -> User {
    let hash = hash_password(password).expect("Password hashing should succeed in test");
    let mut user = User::new(email, hash.clone(), hash, Vec::new());
    user.verified = verified;

    let default = RoleAssignment::new(&user.id, role_id(ctx, RoleName::User), AssignmentStatus::Approved);
    ctx.stores
        .assignments
        .create_role_assignment(&default)
        .await
        .expect("Assignment creation should succeed in test");
    user.role_assignment_ids.push(default.id);

    ctx.stores
        .users
        .create_user(&user)
        .await
        .expect("User creation should succeed in test");
    user
}

/// Assignment store whose deletes always fail.
pub struct FailingDeletes(pub Arc<dyn RoleAssignmentStore>);

#[async_trait]
impl RoleAssignmentStore for FailingDeletes {
    async fn create_role_assignment(&self, assignment: &RoleAssignment) -> StoreResult<()> {
        self.0.create_role_assignment(assignment).await
    }

    async fn get_role_assignments_by_ids(&self, ids: &[String]) -> StoreResult<Vec<RoleAssignment>> {
        self.0.get_role_assignments_by_ids(ids).await
    }

    async fn delete_role_assignment_by_id(&self, _id: &str) -> StoreResult<()> {
        Err(StoreError::Database("disk I/O error".to_string()))
    }
}

/// User store whose updates always fail.
pub struct FailingUpdates(pub Arc<dyn UserStore>);

#[async_trait]
impl UserStore for FailingUpdates {
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.0.get_user_by_email(email).await
    }

    async fn get_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        self.0.get_user_by_id(id).await
    }

    async fn create_user(&self, user: &User) -> StoreResult<()> {
        self.0.create_user(user).await
    }

    async fn update_user(&self, _user: &User) -> StoreResult<()> {
        Err(StoreError::Database("database is locked".to_string()))
    }

    async fn delete_user(&self, id: &str) -> StoreResult<()> {
        self.0.delete_user(id).await
    }
}

/// User store that never finds a user by email and records create attempts.
pub struct RacingSignUps {
    inner: Arc<dyn UserStore>,
    attempts: Arc<Mutex<Vec<User>>>,
}

#[async_trait]
impl UserStore for RacingSignUps {
    async fn get_user_by_email(&self, _email: &str) -> StoreResult<Option<User>> {
        Ok(None)
    }

    async fn get_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        self.inner.get_user_by_id(id).await
    }

    async fn create_user(&self, user: &User) -> StoreResult<()> {
        self.attempts.lock().expect("attempts lock poisoned").push(user.clone());
        self.inner.create_user(user).await
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        self.inner.update_user(user).await
    }

    async fn delete_user(&self, id: &str) -> StoreResult<()> {
        self.inner.delete_user(id).await
    }
}
