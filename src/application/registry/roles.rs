//! Admin and moderator role sets

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::application::errors::StorageError;
use crate::domain::entities::{Role, UserId};
use crate::domain::traits::{Collection, Store};

/// Result of a role mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Added,
    AlreadyPresent,
    Removed,
    NotPresent,
}

/// Holds the admin and moderator lists.
///
/// Each list has its own lock; a mutation keeps the write guard until the
/// store has been rewritten so concurrent mutations of the same list persist
/// in the order they were applied.
pub struct RoleRegistry {
    admins: RwLock<Vec<UserId>>,
    moderators: RwLock<Vec<UserId>>,
    store: Arc<dyn Store>,
}

impl RoleRegistry {
    /// Load both lists from the store
    pub async fn load(store: Arc<dyn Store>) -> Result<Self, StorageError> {
        let admins = store.load_ids(Collection::Admins).await?;
        let moderators = store.load_ids(Collection::Moderators).await?;
        tracing::info!("Loaded {} admins and {} moderators", admins.len(), moderators.len());

        Ok(Self {
            admins: RwLock::new(admins),
            moderators: RwLock::new(moderators),
            store,
        })
    }

    fn set(&self, role: Role) -> &RwLock<Vec<UserId>> {
        match role {
            Role::Admin => &self.admins,
            Role::Moderator => &self.moderators,
        }
    }

    fn collection(role: Role) -> Collection {
        match role {
            Role::Admin => Collection::Admins,
            Role::Moderator => Collection::Moderators,
        }
    }

    pub async fn has_role(&self, role: Role, id: UserId) -> bool {
        self.set(role).read().await.contains(&id)
    }

    pub async fn is_admin(&self, id: UserId) -> bool {
        self.has_role(Role::Admin, id).await
    }

    pub async fn is_moderator(&self, id: UserId) -> bool {
        self.has_role(Role::Moderator, id).await
    }

    /// Grant a role. On a store failure the in-memory list keeps the new id.
    pub async fn add(&self, role: Role, id: UserId) -> Result<Membership, StorageError> {
        let mut ids = self.set(role).write().await;
        if ids.contains(&id) {
            return Ok(Membership::AlreadyPresent);
        }

        ids.push(id);
        self.store.save_ids(Self::collection(role), &ids).await?;
        Ok(Membership::Added)
    }

    /// Revoke a role. On a store failure the in-memory list keeps the removal.
    pub async fn remove(&self, role: Role, id: UserId) -> Result<Membership, StorageError> {
        let mut ids = self.set(role).write().await;
        let Some(pos) = ids.iter().position(|existing| *existing == id) else {
            return Ok(Membership::NotPresent);
        };

        ids.remove(pos);
        self.store.save_ids(Self::collection(role), &ids).await?;
        Ok(Membership::Removed)
    }

    /// Snapshot of a role list in insertion order
    pub async fn list(&self, role: Role) -> Vec<UserId> {
        self.set(role).read().await.clone()
    }

    pub async fn list_admins(&self) -> Vec<UserId> {
        self.list(Role::Admin).await
    }

    pub async fn list_moderators(&self) -> Vec<UserId> {
        self.list(Role::Moderator).await
    }

    /// Add every seed id as admin when the admin list is empty
    pub async fn seed_admins(&self, seeds: &[UserId]) -> Result<usize, StorageError> {
        let mut ids = self.admins.write().await;
        if !ids.is_empty() || seeds.is_empty() {
            return Ok(0);
        }

        for seed in seeds {
            if !ids.contains(seed) {
                ids.push(*seed);
            }
        }
        self.store.save_ids(Collection::Admins, &ids).await?;
        Ok(ids.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::memory::MemoryStore;

    async fn registry(admins: &[i64], moderators: &[i64]) -> (RoleRegistry, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_roles(admins, moderators));
        let registry = RoleRegistry::load(store.clone()).await.unwrap();
        (registry, store)
    }

    #[tokio::test]
    async fn test_roles_are_independent() {
        let (roles, _) = registry(&[1, 3], &[2, 3]).await;

        assert!(roles.is_admin(UserId(1)).await);
        assert!(!roles.is_moderator(UserId(1)).await);

        assert!(!roles.is_admin(UserId(2)).await);
        assert!(roles.is_moderator(UserId(2)).await);

        assert!(roles.is_admin(UserId(3)).await);
        assert!(roles.is_moderator(UserId(3)).await);

        assert!(!roles.is_admin(UserId(4)).await);
        assert!(!roles.is_moderator(UserId(4)).await);
    }

    #[tokio::test]
    async fn test_add_existing_admin_is_idempotent() {
        let (roles, store) = registry(&[111], &[]).await;

        let result = roles.add(Role::Admin, UserId(111)).await.unwrap();
        assert_eq!(result, Membership::AlreadyPresent);
        assert_eq!(roles.list_admins().await, vec![UserId(111)]);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_remove_absent_moderator_reports_not_present() {
        let (roles, store) = registry(&[], &[5]).await;

        let result = roles.remove(Role::Moderator, UserId(6)).await.unwrap();
        assert_eq!(result, Membership::NotPresent);
        assert_eq!(roles.list_moderators().await, vec![UserId(5)]);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_mutations_persist_in_insertion_order() {
        let (roles, store) = registry(&[], &[]).await;

        assert_eq!(roles.add(Role::Moderator, UserId(30)).await.unwrap(), Membership::Added);
        assert_eq!(roles.add(Role::Moderator, UserId(10)).await.unwrap(), Membership::Added);
        assert_eq!(roles.add(Role::Moderator, UserId(20)).await.unwrap(), Membership::Added);
        assert_eq!(roles.remove(Role::Moderator, UserId(10)).await.unwrap(), Membership::Removed);

        assert_eq!(roles.list_moderators().await, vec![UserId(30), UserId(20)]);
        assert_eq!(store.ids(Collection::Moderators), vec![UserId(30), UserId(20)]);
        assert_eq!(store.save_count(), 4);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_in_memory_change() {
        let (roles, store) = registry(&[], &[]).await;
        store.fail_saves(true);

        assert!(roles.add(Role::Admin, UserId(7)).await.is_err());
        assert!(roles.is_admin(UserId(7)).await);
        assert!(store.ids(Collection::Admins).is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_membership_changes_all_persist() {
        let (roles, store) = registry(&[], &[100, 101, 102, 103]).await;
        let roles = Arc::new(roles);

        let mut handles = Vec::new();
        for i in 0..16 {
            let roles = roles.clone();
            handles.push(tokio::spawn(async move {
                roles.add(Role::Moderator, UserId(i)).await.unwrap();
            }));
        }
        for i in 100..104 {
            let roles = roles.clone();
            handles.push(tokio::spawn(async move {
                roles.remove(Role::Moderator, UserId(i)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut persisted = store.ids(Collection::Moderators);
        persisted.sort_by_key(|id| id.0);
        assert_eq!(persisted, (0..16).map(UserId).collect::<Vec<_>>());
        assert_eq!(roles.list_moderators().await.len(), 16);
        assert!(store.ids(Collection::Admins).is_empty());
        assert_eq!(store.save_count(), 20);
    }

    #[tokio::test]
    async fn test_seed_admins_only_when_empty() {
        let (roles, store) = registry(&[], &[]).await;
        assert_eq!(roles.seed_admins(&[UserId(1), UserId(2)]).await.unwrap(), 2);
        assert_eq!(store.ids(Collection::Admins), vec![UserId(1), UserId(2)]);

        assert_eq!(roles.seed_admins(&[UserId(3)]).await.unwrap(), 0);
        assert_eq!(roles.list_admins().await, vec![UserId(1), UserId(2)]);
    }
}
