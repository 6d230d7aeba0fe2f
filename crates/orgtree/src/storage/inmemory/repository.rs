//! In-memory repository implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use orgtree_core::hierarchy::{
    FilterCriteria, Group, GroupId, NewGroup, NewPerson, Person, PersonId,
};
use orgtree_core::storage::{GroupRepository, PersonRepository, RepositoryError, Result};

#[derive(Debug, Default)]
struct Tables {
    groups: BTreeMap<GroupId, Group>,
    persons: BTreeMap<PersonId, Person>,
    last_group_id: GroupId,
    last_person_id: PersonId,
}

/// In-memory storage backend.
///
/// Rows live in ordered maps keyed by ID behind a single `Arc<RwLock<_>>`,
/// so group deletion can detach children and persons atomically. IDs are
/// assigned from per-table counters starting at 1. Data is not persisted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn group_not_found(id: GroupId) -> RepositoryError {
    RepositoryError::NotFound {
        entity_type: "Group",
        id: id.to_string(),
    }
}

fn person_not_found(id: PersonId) -> RepositoryError {
    RepositoryError::NotFound {
        entity_type: "Person",
        id: id.to_string(),
    }
}

#[async_trait]
impl GroupRepository for InMemoryRepository {
    async fn get_group(&self, id: GroupId) -> Result<Option<Group>> {
        let tables = self.tables.read().await;
        Ok(tables.groups.get(&id).cloned())
    }

    async fn get_child_groups(&self, parent_id: GroupId) -> Result<Vec<Group>> {
        let tables = self.tables.read().await;
        Ok(tables
            .groups
            .values()
            .filter(|g| g.parent_group_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let tables = self.tables.read().await;
        Ok(tables.groups.values().cloned().collect())
    }

    async fn create_group(&self, group: &NewGroup) -> Result<Group> {
        let mut tables = self.tables.write().await;
        tables.last_group_id += 1;
        let now = Utc::now();
        let stored = Group {
            id: tables.last_group_id,
            group_name: group.group_name.clone(),
            parent_group_id: group.parent_group_id,
            created_at: now,
            updated_at: now,
        };
        tables.groups.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_group(&self, group: &Group) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.groups.get_mut(&group.id) {
            Some(existing) => {
                *existing = group.clone();
                Ok(())
            }
            None => Err(group_not_found(group.id)),
        }
    }

    async fn delete_group(&self, id: GroupId) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.groups.remove(&id).is_none() {
            return Err(group_not_found(id));
        }

        let now = Utc::now();
        for child in tables
            .groups
            .values_mut()
            .filter(|g| g.parent_group_id == Some(id))
        {
            child.parent_group_id = None;
            child.updated_at = now;
        }
        for person in tables
            .persons
            .values_mut()
            .filter(|p| p.group_id == Some(id))
        {
            person.group_id = None;
            person.updated_at = now;
        }
        Ok(())
    }

    async fn touch_group(&self, id: GroupId, at: DateTime<Utc>) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.groups.get_mut(&id) {
            Some(group) => {
                group.updated_at = at;
                Ok(())
            }
            None => Err(group_not_found(id)),
        }
    }
}

#[async_trait]
impl PersonRepository for InMemoryRepository {
    async fn get_person(&self, id: PersonId) -> Result<Option<Person>> {
        let tables = self.tables.read().await;
        Ok(tables.persons.get(&id).cloned())
    }

    async fn list_persons(&self) -> Result<Vec<Person>> {
        let tables = self.tables.read().await;
        Ok(tables.persons.values().cloned().collect())
    }

    async fn get_persons_by_group(
        &self,
        group_id: GroupId,
        filters: &FilterCriteria,
    ) -> Result<Vec<Person>> {
        let tables = self.tables.read().await;
        Ok(tables
            .persons
            .values()
            .filter(|p| p.group_id == Some(group_id))
            .filter(|p| filters.matches(p))
            .cloned()
            .collect())
    }

    async fn create_person(&self, person: &NewPerson) -> Result<Person> {
        let mut tables = self.tables.write().await;
        tables.last_person_id += 1;
        let now = Utc::now();
        let stored = Person {
            id: tables.last_person_id,
            first_name: person.first_name.clone(),
            last_name: person.last_name.clone(),
            job_title: person.job_title.clone(),
            group_id: person.group_id,
            created_at: now,
            updated_at: now,
        };
        tables.persons.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_person(&self, person: &Person) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.persons.get_mut(&person.id) {
            Some(existing) => {
                *existing = person.clone();
                Ok(())
            }
            None => Err(person_not_found(person.id)),
        }
    }

    async fn delete_person(&self, id: PersonId) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.persons.remove(&id).is_none() {
            return Err(person_not_found(id));
        }
        Ok(())
    }
}
