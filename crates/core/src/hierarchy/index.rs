//! Id-indexed snapshot of the group tree.
//!
//! Groups are stored in an arena keyed by ID with parent pointers and child
//! index lists, so closure queries never follow live references. Every walk
//! tracks visited IDs and terminates even if the stored tree already contains
//! a cycle.

use std::collections::{HashMap, HashSet};

use super::types::{Group, GroupId};

#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    parents: HashMap<GroupId, Option<GroupId>>,
    children: HashMap<GroupId, Vec<GroupId>>,
}

impl GroupIndex {
    /// Builds the index from a snapshot of group rows.
    pub fn from_groups<'a>(groups: impl IntoIterator<Item = &'a Group>) -> Self {
        let mut index = Self::default();
        for group in groups {
            index.parents.insert(group.id, group.parent_group_id);
            if let Some(parent_id) = group.parent_group_id {
                index.children.entry(parent_id).or_default().push(group.id);
            }
        }
        for ids in index.children.values_mut() {
            ids.sort_unstable();
        }
        index
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn contains(&self, id: GroupId) -> bool {
        self.parents.contains_key(&id)
    }

    /// Returns the parent ID recorded for a group, if the group is known and has one.
    pub fn parent_of(&self, id: GroupId) -> Option<GroupId> {
        self.parents.get(&id).copied().flatten()
    }

    /// Returns the direct children of a group, sorted by ID.
    pub fn children_of(&self, id: GroupId) -> &[GroupId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns every group reachable by following child relations from `id`,
    /// excluding `id` itself.
    pub fn descendant_ids(&self, id: GroupId) -> HashSet<GroupId> {
        let mut seen = HashSet::new();
        let mut stack: Vec<GroupId> = self.children_of(id).to_vec();
        while let Some(current) = stack.pop() {
            if current == id || !seen.insert(current) {
                continue;
            }
            stack.extend_from_slice(self.children_of(current));
        }
        seen
    }

    /// Returns the ancestor IDs of `id`, nearest first, stopping at the root,
    /// at a dangling parent, or when a cycle is detected.
    pub fn ancestor_ids(&self, id: GroupId) -> Vec<GroupId> {
        let mut seen = HashSet::from([id]);
        let mut ancestors = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(parent_id) = current {
            if !self.contains(parent_id) || !seen.insert(parent_id) {
                break;
            }
            ancestors.push(parent_id);
            current = self.parent_of(parent_id);
        }
        ancestors
    }

    /// Returns true if making `new_parent` the parent of `group_id` would
    /// turn the group into its own ancestor.
    pub fn would_create_cycle(&self, group_id: GroupId, new_parent: GroupId) -> bool {
        new_parent == group_id || self.descendant_ids(group_id).contains(&new_parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1 ─┬─ 2 ── 4
    ///    └─ 3
    /// 5 (separate root)
    fn sample() -> Vec<Group> {
        vec![
            Group::new(1, "Root"),
            Group::new(2, "Eng").with_parent(1),
            Group::new(3, "Sales").with_parent(1),
            Group::new(4, "Platform").with_parent(2),
            Group::new(5, "Other"),
        ]
    }

    #[test]
    fn test_children_sorted() {
        let index = GroupIndex::from_groups(&sample());
        assert_eq!(index.children_of(1), &[2, 3]);
        assert_eq!(index.children_of(4), &[] as &[GroupId]);
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_descendant_ids() {
        let index = GroupIndex::from_groups(&sample());
        assert_eq!(index.descendant_ids(1), HashSet::from([2, 3, 4]));
        assert_eq!(index.descendant_ids(2), HashSet::from([4]));
        assert!(index.descendant_ids(5).is_empty());
        assert!(index.descendant_ids(99).is_empty());
    }

    #[test]
    fn test_ancestor_ids() {
        let index = GroupIndex::from_groups(&sample());
        assert_eq!(index.ancestor_ids(4), vec![2, 1]);
        assert!(index.ancestor_ids(1).is_empty());
    }

    #[test]
    fn test_ancestor_ids_stop_at_dangling_parent() {
        let groups = vec![Group::new(2, "Orphan").with_parent(1)];
        let index = GroupIndex::from_groups(&groups);
        assert!(index.ancestor_ids(2).is_empty());
        assert_eq!(index.parent_of(2), Some(1));
    }

    #[test]
    fn test_would_create_cycle() {
        let index = GroupIndex::from_groups(&sample());
        // Moving a group under its own descendant
        assert!(index.would_create_cycle(1, 4));
        assert!(index.would_create_cycle(2, 4));
        // Moving a group under itself
        assert!(index.would_create_cycle(3, 3));
        // Legal moves
        assert!(!index.would_create_cycle(4, 3));
        assert!(!index.would_create_cycle(1, 5));
    }

    #[test]
    fn test_walks_terminate_on_corrupted_cycle() {
        let groups = vec![
            Group::new(1, "A").with_parent(2),
            Group::new(2, "B").with_parent(1),
        ];
        let index = GroupIndex::from_groups(&groups);
        assert_eq!(index.descendant_ids(1), HashSet::from([2]));
        assert_eq!(index.ancestor_ids(1), vec![2]);
    }
}
