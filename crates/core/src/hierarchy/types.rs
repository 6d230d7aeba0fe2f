use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a group.
pub type GroupId = i64;

/// Store-assigned identifier of a person.
pub type PersonId = i64;

/// A node of the organizational tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub group_name: String,
    /// Parent group, `None` for a root group.
    pub parent_group_id: Option<GroupId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// Creates a root group with the given ID and name.
    pub fn new(id: GroupId, group_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            group_name: group_name.into(),
            parent_group_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the parent group.
    pub fn with_parent(mut self, parent_group_id: GroupId) -> Self {
        self.parent_group_id = Some(parent_group_id);
        self
    }

    /// Sets the creation timestamp (useful for testing).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Sets the update timestamp (useful for testing).
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }

    /// Returns true if this group has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_group_id.is_none()
    }
}

/// A member of the organization, assigned to at most one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
    pub job_title: String,
    /// Owning group, `None` when unassigned.
    pub group_id: Option<GroupId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Person {
    /// Creates an unassigned person.
    pub fn new(
        id: PersonId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        job_title: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            job_title: job_title.into(),
            group_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Assigns the person to a group.
    pub fn in_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Sets the creation timestamp (useful for testing).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Sets the update timestamp (useful for testing).
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }
}

/// Insert payload for a group; the store assigns the ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub group_name: String,
    pub parent_group_id: Option<GroupId>,
}

impl NewGroup {
    pub fn new(group_name: impl Into<String>, parent_group_id: Option<GroupId>) -> Self {
        Self {
            group_name: group_name.into(),
            parent_group_id,
        }
    }
}

/// Insert payload for a person; the store assigns the ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub first_name: String,
    pub last_name: String,
    pub job_title: String,
    pub group_id: Option<GroupId>,
}

impl NewPerson {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        job_title: impl Into<String>,
        group_id: Option<GroupId>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            job_title: job_title.into(),
            group_id,
        }
    }
}

/// Partial update of a group.
///
/// `parent_group_id` is doubly optional: `None` leaves the parent alone,
/// `Some(None)` detaches the group into a root, `Some(Some(id))` re-parents it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupUpdate {
    pub group_name: Option<String>,
    pub parent_group_id: Option<Option<GroupId>>,
}

impl GroupUpdate {
    /// Returns the requested parent if it differs from the group's current one.
    pub fn parent_change(&self, group: &Group) -> Option<Option<GroupId>> {
        self.parent_group_id
            .filter(|parent| *parent != group.parent_group_id)
    }

    /// Applies the update to an existing group.
    pub fn apply_to(self, group: &mut Group, now: DateTime<Utc>) {
        if let Some(group_name) = self.group_name {
            group.group_name = group_name;
        }
        if let Some(parent_group_id) = self.parent_group_id {
            group.parent_group_id = parent_group_id;
        }
        group.updated_at = now;
    }
}

/// Partial update of a person. `group_id` follows the same convention as
/// [`GroupUpdate::parent_group_id`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub job_title: Option<String>,
    pub group_id: Option<Option<GroupId>>,
}

impl PersonUpdate {
    /// Applies the update to an existing person.
    pub fn apply_to(self, person: &mut Person, now: DateTime<Utc>) {
        if let Some(first_name) = self.first_name {
            person.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            person.last_name = last_name;
        }
        if let Some(job_title) = self.job_title {
            person.job_title = job_title;
        }
        if let Some(group_id) = self.group_id {
            person.group_id = group_id;
        }
        person.updated_at = now;
    }
}

/// Kind of structural write reported to the invalidation hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update,
    Delete,
}

/// A group together with its chain of ancestors.
///
/// `parent_group` holds at most one element; it is empty at the root or when
/// the parent row is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AncestorNode {
    pub id: GroupId,
    pub group_name: String,
    pub parent_group: Vec<AncestorNode>,
}

impl AncestorNode {
    /// Creates a node with no resolved parent.
    pub fn root(group: &Group) -> Self {
        Self {
            id: group.id,
            group_name: group.group_name.clone(),
            parent_group: Vec::new(),
        }
    }

    /// Creates a node whose ancestor chain continues with `parent`.
    pub fn with_parent(group: &Group, parent: AncestorNode) -> Self {
        Self {
            id: group.id,
            group_name: group.group_name.clone(),
            parent_group: vec![parent],
        }
    }

    /// Returns the parent node, if any.
    pub fn parent(&self) -> Option<&AncestorNode> {
        self.parent_group.first()
    }

    /// Returns the IDs from this node up to the topmost resolved ancestor.
    pub fn chain_ids(&self) -> Vec<GroupId> {
        let mut ids = vec![self.id];
        let mut current = self;
        while let Some(parent) = current.parent() {
            ids.push(parent.id);
            current = parent;
        }
        ids
    }
}

/// A group with its matching persons and all of its descendants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtreeNode {
    pub id: GroupId,
    pub group_name: String,
    /// Persons directly in this group that match the active filters.
    pub persons: Vec<Person>,
    /// One node per direct child group.
    pub groups: Vec<SubtreeNode>,
}

impl SubtreeNode {
    pub fn new(group: &Group, persons: Vec<Person>, groups: Vec<SubtreeNode>) -> Self {
        Self {
            id: group.id,
            group_name: group.group_name.clone(),
            persons,
            groups,
        }
    }

    /// Returns every group ID in the subtree, in pre-order.
    pub fn group_ids(&self) -> Vec<GroupId> {
        let mut ids = vec![self.id];
        for child in &self.groups {
            ids.extend(child.group_ids());
        }
        ids
    }

    /// Returns the number of persons across the whole subtree.
    pub fn person_count(&self) -> usize {
        self.persons.len()
            + self
                .groups
                .iter()
                .map(SubtreeNode::person_count)
                .sum::<usize>()
    }
}
