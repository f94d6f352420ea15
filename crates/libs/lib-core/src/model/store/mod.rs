//! # Database Store
//!
//! Store contracts consumed by the services, plus their SQLite implementation.
//!
//! The services only see the three traits below through [`Stores`], so tests
//! can wrap or replace any one of them.

// region: --- Modules
pub mod models;
pub mod role_assignment_repository;
pub mod role_repository;
pub mod seed;
pub mod user_repository;
// endregion: --- Modules

// region: --- Re-exports
pub use role_assignment_repository::RoleAssignmentRepository;
pub use role_repository::RoleRepository;
pub use seed::seed_roles;
pub use user_repository::UserRepository;
// endregion: --- Re-exports

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

use models::{Role, RoleAssignment, RoleName, User};

// region: --- Errors

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound(err.to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            _ => StoreError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Database(format!("malformed column: {err}"))
    }
}

// endregion: --- Errors

// region: --- Contracts

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn get_user_by_id(&self, id: &str) -> StoreResult<Option<User>>;
    async fn create_user(&self, user: &User) -> StoreResult<()>;
    /// Full replace of every mutable column.
    async fn update_user(&self, user: &User) -> StoreResult<()>;
    async fn delete_user(&self, id: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn get_role_by_id(&self, id: &str) -> StoreResult<Option<Role>>;
    async fn get_role_by_name(&self, name: RoleName) -> StoreResult<Option<Role>>;
    /// Unknown ids are skipped; results follow the order of `ids`.
    async fn get_roles_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Role>>;
    async fn get_roles(&self) -> StoreResult<Vec<Role>>;
    async fn create_role(&self, role: &Role) -> StoreResult<()>;
}

#[async_trait]
pub trait RoleAssignmentStore: Send + Sync {
    async fn create_role_assignment(&self, assignment: &RoleAssignment) -> StoreResult<()>;
    /// Unknown ids are skipped; results follow the order of `ids`.
    async fn get_role_assignments_by_ids(&self, ids: &[String]) -> StoreResult<Vec<RoleAssignment>>;
    async fn delete_role_assignment_by_id(&self, id: &str) -> StoreResult<()>;
}

/// Bundle of store handles shared by the services.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub roles: Arc<dyn RoleStore>,
    pub assignments: Arc<dyn RoleAssignmentStore>,
}

impl Stores {
    /// SQLite-backed stores sharing one pool.
    pub fn sqlite(pool: DbPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            roles: Arc::new(RoleRepository::new(pool.clone())),
            assignments: Arc::new(RoleAssignmentRepository::new(pool)),
        }
    }
}

// endregion: --- Contracts

// region: --- Types and Functions

/// Type alias for SQLite connection pool.
pub type DbPool = SqlitePool;

/// Create a new SQLite connection pool, creating the file (and its
/// directory) if missing.
pub async fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    if let Some(path) = database_url.strip_prefix("sqlite:") {
        let path = path.trim_start_matches("//");
        if !path.starts_with(":memory:") {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                    tracing::info!("Created database directory: {:?}", parent);
                }
            }
        }
    }

    let options = database_url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(options).await?;

    Ok(pool)
}

/// Single-connection in-memory pool with migrations applied.
///
/// Every connection to `sqlite::memory:` opens its own database, hence the
/// connection cap.
pub async fn create_memory_pool() -> anyhow::Result<DbPool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    migrate(&pool).await?;

    Ok(pool)
}

/// Apply the embedded schema migrations.
pub async fn migrate(pool: &DbPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Placeholder list `?, ?, ?` for an `IN` clause of `len` items.
pub(crate) fn placeholders(len: usize) -> String {
    vec!["?"; len].join(", ")
}

/// Reorder `rows` to follow `ids`, dropping ids with no row.
pub(crate) fn in_id_order<T>(ids: &[String], rows: Vec<T>, id_of: impl Fn(&T) -> &str) -> Vec<T> {
    let mut by_id: std::collections::HashMap<String, T> =
        rows.into_iter().map(|row| (id_of(&row).to_string(), row)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

// endregion: --- Types and Functions
