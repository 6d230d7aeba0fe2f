use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::hierarchy::{FilterCriteria, Group, GroupId, NewGroup, NewPerson, Person, PersonId};

use super::Result;

/// Repository for group operations.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Gets a group by its ID.
    async fn get_group(&self, id: GroupId) -> Result<Option<Group>>;

    /// Gets the direct children of a group, ordered by ID.
    async fn get_child_groups(&self, parent_id: GroupId) -> Result<Vec<Group>>;

    /// Gets every group, ordered by ID.
    async fn list_groups(&self) -> Result<Vec<Group>>;

    /// Creates a new group and returns the stored row.
    async fn create_group(&self, group: &NewGroup) -> Result<Group>;

    /// Updates an existing group.
    async fn update_group(&self, group: &Group) -> Result<()>;

    /// Deletes a group by its ID.
    ///
    /// Children and persons of the deleted group are detached (their parent or
    /// group reference is cleared).
    async fn delete_group(&self, id: GroupId) -> Result<()>;

    /// Bumps the `updated_at` bookkeeping of a group.
    async fn touch_group(&self, id: GroupId, at: DateTime<Utc>) -> Result<()>;
}

/// Repository for person operations.
#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// Gets a person by their ID.
    async fn get_person(&self, id: PersonId) -> Result<Option<Person>>;

    /// Gets every person, ordered by ID.
    async fn list_persons(&self) -> Result<Vec<Person>>;

    /// Gets the persons directly in a group that satisfy every filter, ordered by ID.
    async fn get_persons_by_group(
        &self,
        group_id: GroupId,
        filters: &FilterCriteria,
    ) -> Result<Vec<Person>>;

    /// Creates a new person and returns the stored row.
    async fn create_person(&self, person: &NewPerson) -> Result<Person>;

    /// Updates an existing person.
    async fn update_person(&self, person: &Person) -> Result<()>;

    /// Deletes a person by their ID.
    async fn delete_person(&self, id: PersonId) -> Result<()>;
}
