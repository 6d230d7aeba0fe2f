//! Cache invalidation after structural writes.
//!
//! Every hook runs after the store write has succeeded and is awaited before
//! the write returns, so any read that starts afterwards recomputes. Cache
//! failures are logged and never fail the write; the affected entries expire
//! with their TTL.

use std::sync::Arc;

use chrono::Utc;

use orgtree_core::cache::{
    person_key, Cache, CacheAside, ALL_GROUPS_KEY, ALL_PERSONS_KEY, ANCESTORS_PREFIX,
    SUBTREE_PREFIX,
};
use orgtree_core::hierarchy::{GroupId, GroupIndex, HierarchyError, PersonId, Result, WriteKind};
use orgtree_core::storage::GroupRepository;

#[derive(Clone)]
pub struct InvalidationCoordinator {
    groups: Arc<dyn GroupRepository>,
    cache: CacheAside<dyn Cache>,
}

impl InvalidationCoordinator {
    pub fn new(groups: Arc<dyn GroupRepository>, cache: CacheAside<dyn Cache>) -> Self {
        Self { groups, cache }
    }

    /// Clears person-level entries after a person write.
    ///
    /// Subtree results embed persons, so the subtree key space is cleared as
    /// well. When the group assignment changed, the old and new groups get
    /// their `updated_at` bumped.
    pub async fn on_person_write(
        &self,
        kind: WriteKind,
        person_id: PersonId,
        old_group_id: Option<GroupId>,
        new_group_id: Option<GroupId>,
    ) {
        tracing::debug!(?kind, person_id, ?old_group_id, ?new_group_id, "Invalidating after person write");

        self.invalidate(ALL_PERSONS_KEY).await;
        self.invalidate(&person_key(person_id)).await;
        self.invalidate_prefix(SUBTREE_PREFIX).await;

        if old_group_id != new_group_id {
            let now = Utc::now();
            for group_id in [old_group_id, new_group_id].into_iter().flatten() {
                if let Err(err) = self.groups.touch_group(group_id, now).await {
                    tracing::warn!(group_id, error = %err, "Failed to touch group");
                }
            }
            // Touched rows appear in the group listing
            self.invalidate(ALL_GROUPS_KEY).await;
        }
    }

    /// Clears group-level entries after a group write.
    ///
    /// Any group write can change any ancestor chain or subtree, so both
    /// key spaces are cleared whole.
    pub async fn on_group_write(
        &self,
        kind: WriteKind,
        group_id: GroupId,
        old_parent_id: Option<GroupId>,
        new_parent_id: Option<GroupId>,
    ) {
        tracing::debug!(?kind, group_id, ?old_parent_id, ?new_parent_id, "Invalidating after group write");

        self.invalidate(ALL_GROUPS_KEY).await;
        self.invalidate_prefix(SUBTREE_PREFIX).await;
        self.invalidate_prefix(ANCESTORS_PREFIX).await;
    }

    /// Clears person entries for members detached by a group deletion.
    pub async fn on_members_detached(&self, person_ids: &[PersonId]) {
        if person_ids.is_empty() {
            return;
        }

        tracing::debug!(count = person_ids.len(), "Invalidating detached members");

        self.invalidate(ALL_PERSONS_KEY).await;
        for person_id in person_ids {
            self.invalidate(&person_key(*person_id)).await;
        }
    }

    /// Rejects moving `group_id` under `new_parent_id` if that would make the
    /// group its own ancestor.
    ///
    /// Uses a snapshot of every group taken before the edit. Callers must
    /// hold the group write lock so the snapshot stays current until the
    /// update is applied.
    pub async fn ensure_acyclic(&self, group_id: GroupId, new_parent_id: GroupId) -> Result<()> {
        let snapshot = self.groups.list_groups().await?;
        let index = GroupIndex::from_groups(&snapshot);

        if index.would_create_cycle(group_id, new_parent_id) {
            tracing::info!(group_id, parent_id = new_parent_id, "Rejected cyclic re-parenting");
            return Err(HierarchyError::StructuralConflict {
                group_id,
                parent_id: new_parent_id,
            });
        }

        Ok(())
    }

    async fn invalidate(&self, key: &str) {
        if let Err(err) = self.cache.invalidate(key).await {
            tracing::warn!(key, error = %err, "Failed to invalidate cache key");
        }
    }

    async fn invalidate_prefix(&self, prefix: &str) {
        if let Err(err) = self.cache.invalidate_prefix(prefix).await {
            tracing::warn!(prefix, error = %err, "Failed to invalidate cache prefix");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use orgtree_core::cache::{ancestors_key, subtree_key, DEFAULT_TTL};
    use orgtree_core::hierarchy::{FilterCriteria, Group};

    use crate::hierarchy::testing::{MockCache, MockStore};

    async fn populated_cache() -> Arc<MockCache> {
        let cache = Arc::new(MockCache::default());
        for key in [
            ALL_GROUPS_KEY.to_string(),
            ALL_PERSONS_KEY.to_string(),
            person_key(1),
            person_key(2),
            ancestors_key(2),
            subtree_key(1, &FilterCriteria::new()),
        ] {
            cache.set(&key, b"{}", None).await.unwrap();
        }
        cache
    }

    fn coordinator(store: Arc<MockStore>, cache: Arc<MockCache>) -> InvalidationCoordinator {
        InvalidationCoordinator::new(store, CacheAside::new(cache as Arc<dyn Cache>, DEFAULT_TTL))
    }

    #[tokio::test]
    async fn test_person_update_clears_person_keys() {
        let store = MockStore::scenario().await;
        let cache = populated_cache().await;
        let coordinator = coordinator(store.clone(), cache.clone());

        coordinator
            .on_person_write(WriteKind::Update, 1, Some(2), Some(2))
            .await;

        assert_eq!(
            cache.keys().await,
            vec!["all_groups", "group_above_2", "person_id_2"]
        );
        assert!(store.touched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_person_move_touches_both_groups() {
        let store = MockStore::scenario().await;
        let cache = populated_cache().await;
        let coordinator = coordinator(store.clone(), cache.clone());

        coordinator
            .on_person_write(WriteKind::Update, 1, Some(2), Some(1))
            .await;

        assert_eq!(*store.touched.lock().unwrap(), vec![2, 1]);
        assert!(!cache.contains(ALL_GROUPS_KEY).await);
    }

    #[tokio::test]
    async fn test_person_create_touches_new_group_only() {
        let store = MockStore::scenario().await;
        let coordinator = coordinator(store.clone(), Arc::new(MockCache::default()));

        coordinator
            .on_person_write(WriteKind::Create, 3, None, Some(1))
            .await;

        assert_eq!(*store.touched.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_group_write_clears_group_spaces() {
        let store = MockStore::scenario().await;
        let cache = populated_cache().await;
        let coordinator = coordinator(store, cache.clone());

        coordinator
            .on_group_write(WriteKind::Delete, 2, Some(1), None)
            .await;

        assert_eq!(
            cache.keys().await,
            vec!["all_persons", "person_id_1", "person_id_2"]
        );
    }

    #[tokio::test]
    async fn test_detached_members_are_cleared() {
        let store = MockStore::scenario().await;
        let cache = populated_cache().await;
        let coordinator = coordinator(store, cache.clone());

        coordinator.on_members_detached(&[2]).await;

        assert_eq!(
            cache.keys().await,
            vec![
                "all_groups",
                "group_above_2",
                "groups_below_1_[]",
                "person_id_1"
            ]
        );
    }

    #[tokio::test]
    async fn test_cycle_detection() {
        let store = MockStore::scenario().await;
        store.insert_group(Group::new(3, "Team").with_parent(2)).await;
        let coordinator = coordinator(store.clone(), Arc::new(MockCache::default()));

        // Root under its grandchild
        assert_eq!(
            coordinator.ensure_acyclic(1, 3).await,
            Err(HierarchyError::StructuralConflict {
                group_id: 1,
                parent_id: 3,
            })
        );
        // Group under itself
        assert!(coordinator.ensure_acyclic(2, 2).await.is_err());
        // Sibling move
        assert!(coordinator.ensure_acyclic(3, 1).await.is_ok());

        // Nothing was written
        assert_eq!(store.group(1).await.unwrap().parent_group_id, None);
    }

    #[tokio::test]
    async fn test_cycle_check_propagates_store_failure() {
        let store = MockStore::scenario().await;
        let coordinator = coordinator(store.clone(), Arc::new(MockCache::default()));

        store.fail(true);

        assert!(matches!(
            coordinator.ensure_acyclic(1, 2).await,
            Err(HierarchyError::Compute(_))
        ));
    }
}
