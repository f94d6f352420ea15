//! # Role Assignment Repository
//!
//! SQLite implementation of [`RoleAssignmentStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::models::RoleAssignment;
use super::{in_id_order, placeholders, DbPool, RoleAssignmentStore, StoreError, StoreResult};

const SELECT_ASSIGNMENT: &str =
    "SELECT id, user_id, role_id, status, created_at, updated_at FROM role_assignments";

#[derive(Debug, Clone)]
pub struct RoleAssignmentRepository {
    pool: DbPool,
}

impl RoleAssignmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleAssignmentStore for RoleAssignmentRepository {
    async fn create_role_assignment(&self, assignment: &RoleAssignment) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO role_assignments (id, user_id, role_id, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&assignment.id)
        .bind(&assignment.user_id)
        .bind(&assignment.role_id)
        .bind(assignment.status.as_str())
        .bind(assignment.created_at)
        .bind(assignment.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_role_assignments_by_ids(&self, ids: &[String]) -> StoreResult<Vec<RoleAssignment>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("{SELECT_ASSIGNMENT} WHERE id IN ({})", placeholders(ids.len()));
        let mut query = sqlx::query_as::<_, AssignmentRow>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let assignments = query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(RoleAssignment::try_from)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(in_id_order(ids, assignments, |a| a.id.as_str()))
    }

    async fn delete_role_assignment_by_id(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM role_assignments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("role assignment {id}")));
        }

        Ok(())
    }
}

#[derive(FromRow)]
struct AssignmentRow {
    id: String,
    user_id: String,
    role_id: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AssignmentRow> for RoleAssignment {
    type Error = StoreError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        Ok(RoleAssignment {
            id: row.id,
            user_id: row.user_id,
            role_id: row.role_id,
            status: row.status.parse().map_err(StoreError::Database)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
