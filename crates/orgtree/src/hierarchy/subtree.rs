//! Filtered subtree traversal.
//!
//! The whole subtree is memoized as one entry under
//! `groups_below_<id>_<filters>`. Nested levels are computed directly from
//! the store and are not cached on their own.

use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use orgtree_core::cache::{subtree_key, Cache, CacheAside};
use orgtree_core::hierarchy::{FilterCriteria, GroupId, HierarchyError, Result, SubtreeNode};
use orgtree_core::storage::{GroupRepository, PersonRepository};

#[derive(Clone)]
pub struct SubtreeTraversal {
    groups: Arc<dyn GroupRepository>,
    persons: Arc<dyn PersonRepository>,
    cache: CacheAside<dyn Cache>,
}

impl SubtreeTraversal {
    pub fn new(
        groups: Arc<dyn GroupRepository>,
        persons: Arc<dyn PersonRepository>,
        cache: CacheAside<dyn Cache>,
    ) -> Self {
        Self {
            groups,
            persons,
            cache,
        }
    }

    /// Returns the group with its matching persons and all descendant groups.
    ///
    /// Fails with `NotFound` if the group, or any group met while descending,
    /// is missing. No partial tree is returned.
    pub async fn fetch_subtree(
        &self,
        group_id: GroupId,
        filters: &FilterCriteria,
    ) -> Result<SubtreeNode> {
        let key = subtree_key(group_id, filters);
        self.cache
            .get_or_compute(&key, || self.compute(group_id, filters))
            .await
    }

    fn compute<'a>(
        &'a self,
        group_id: GroupId,
        filters: &'a FilterCriteria,
    ) -> BoxFuture<'a, Result<SubtreeNode>> {
        async move {
            let group = self
                .groups
                .get_group(group_id)
                .await?
                .ok_or_else(|| HierarchyError::group_not_found(group_id))?;

            let persons = self.persons.get_persons_by_group(group_id, filters).await?;
            let children = self.groups.get_child_groups(group_id).await?;

            let mut nodes = Vec::with_capacity(children.len());
            for child in &children {
                nodes.push(self.compute(child.id, filters).await?);
            }

            Ok(SubtreeNode::new(&group, persons, nodes))
        }
        .boxed()
    }
}
