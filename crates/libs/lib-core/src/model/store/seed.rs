//! Role catalog seeding.

use super::models::{Role, RoleName};
use super::{RoleStore, StoreResult};

/// Insert every missing catalog role. Returns the roles created by this call.
pub async fn seed_roles(store: &dyn RoleStore) -> StoreResult<Vec<Role>> {
    let mut created = Vec::new();

    for name in RoleName::ALL {
        if store.get_role_by_name(name).await?.is_some() {
            continue;
        }

        let role = Role::new(name);
        store.create_role(&role).await?;
        tracing::info!("[SEED] Created role '{}' ({})", role.name, role.id);
        created.push(role);
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::store::{create_memory_pool, RoleRepository};

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let repo = RoleRepository::new(create_memory_pool().await.unwrap());

        let first = seed_roles(&repo).await.unwrap();
        let second = seed_roles(&repo).await.unwrap();

        assert_eq!(first.len(), 3);
        assert!(second.is_empty());

        let roles = repo.get_roles().await.unwrap();
        assert_eq!(roles.len(), 3);
        assert_eq!(roles.iter().filter(|r| r.is_default).count(), 1);
    }
}
