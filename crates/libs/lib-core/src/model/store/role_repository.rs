//! # Role Repository
//!
//! SQLite implementation of [`RoleStore`] over the `roles` catalog table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::models::{Role, RoleName};
use super::{in_id_order, placeholders, DbPool, RoleStore, StoreError, StoreResult};

const SELECT_ROLE: &str = "SELECT id, name, is_default, created_at, updated_at FROM roles";

#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: DbPool,
}

impl RoleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for RoleRepository {
    async fn get_role_by_id(&self, id: &str) -> StoreResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(&format!("{SELECT_ROLE} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Role::try_from).transpose()
    }

    async fn get_role_by_name(&self, name: RoleName) -> StoreResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(&format!("{SELECT_ROLE} WHERE name = ?"))
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Role::try_from).transpose()
    }

    async fn get_roles_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Role>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("{SELECT_ROLE} WHERE id IN ({})", placeholders(ids.len()));
        let mut query = sqlx::query_as::<_, RoleRow>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let roles = query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Role::try_from)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(in_id_order(ids, roles, |r| r.id.as_str()))
    }

    async fn get_roles(&self) -> StoreResult<Vec<Role>> {
        sqlx::query_as::<_, RoleRow>(&format!("{SELECT_ROLE} ORDER BY created_at, name"))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Role::try_from)
            .collect()
    }

    async fn create_role(&self, role: &Role) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO roles (id, name, is_default, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&role.id)
        .bind(role.name.as_str())
        .bind(role.is_default)
        .bind(role.created_at)
        .bind(role.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(FromRow)]
struct RoleRow {
    id: String,
    name: String,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RoleRow> for Role {
    type Error = StoreError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        Ok(Role {
            id: row.id,
            name: row.name.parse().map_err(StoreError::Database)?,
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::store::create_memory_pool;

    async fn setup_repo() -> RoleRepository {
        RoleRepository::new(create_memory_pool().await.expect("Failed to create test database"))
    }

    #[tokio::test]
    async fn test_create_and_lookup_role() {
        let repo = setup_repo().await;
        let role = Role::new(RoleName::Specialist);
        repo.create_role(&role).await.unwrap();

        assert_eq!(repo.get_role_by_id(&role.id).await.unwrap(), Some(role.clone()));
        assert_eq!(repo.get_role_by_name(RoleName::Specialist).await.unwrap(), Some(role));
        assert!(repo.get_role_by_name(RoleName::Minion).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_role_names_are_unique() {
        let repo = setup_repo().await;
        repo.create_role(&Role::new(RoleName::User)).await.unwrap();

        let result = repo.create_role(&Role::new(RoleName::User)).await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_get_roles_by_ids_keeps_input_order() {
        let repo = setup_repo().await;
        let roles: Vec<Role> = RoleName::ALL.iter().map(|n| Role::new(*n)).collect();
        for role in &roles {
            repo.create_role(role).await.unwrap();
        }

        let ids = vec![roles[2].id.clone(), "unknown".to_string(), roles[0].id.clone()];
        let found = repo.get_roles_by_ids(&ids).await.unwrap();

        assert_eq!(
            found.iter().map(|r| r.name).collect::<Vec<_>>(),
            vec![RoleName::Minion, RoleName::User]
        );
        assert!(repo.get_roles_by_ids(&[]).await.unwrap().is_empty());
        assert_eq!(repo.get_roles().await.unwrap().len(), 3);
    }
}
