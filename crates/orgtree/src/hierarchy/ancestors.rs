//! Ancestor chain traversal.
//!
//! Each level of the chain is memoized under its own `group_above_<id>` key,
//! so a cached parent chain is reused by every descendant that reaches it.

use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use orgtree_core::cache::{ancestors_key, Cache, CacheAside};
use orgtree_core::hierarchy::{AncestorNode, GroupId, HierarchyError, Result};
use orgtree_core::storage::GroupRepository;

#[derive(Clone)]
pub struct AncestorTraversal {
    groups: Arc<dyn GroupRepository>,
    cache: CacheAside<dyn Cache>,
}

impl AncestorTraversal {
    pub fn new(groups: Arc<dyn GroupRepository>, cache: CacheAside<dyn Cache>) -> Self {
        Self { groups, cache }
    }

    /// Returns the group with its nested chain of ancestors up to the root.
    ///
    /// Fails with `NotFound` if the group does not exist. A missing parent
    /// row ends the chain instead of failing.
    pub fn fetch_ancestors(&self, group_id: GroupId) -> BoxFuture<'_, Result<AncestorNode>> {
        async move {
            let key = ancestors_key(group_id);
            self.cache
                .get_or_compute(&key, || self.compute(group_id))
                .await
        }
        .boxed()
    }

    async fn compute(&self, group_id: GroupId) -> Result<AncestorNode> {
        let group = self
            .groups
            .get_group(group_id)
            .await?
            .ok_or_else(|| HierarchyError::group_not_found(group_id))?;

        let Some(parent_id) = group.parent_group_id else {
            return Ok(AncestorNode::root(&group));
        };

        match self.fetch_ancestors(parent_id).await {
            Ok(parent) => Ok(AncestorNode::with_parent(&group, parent)),
            Err(err) if err.is_not_found() => {
                tracing::debug!(group_id, parent_id, "Parent group missing, ending ancestor chain");
                Ok(AncestorNode::root(&group))
            }
            Err(err) => Err(err),
        }
    }
}
