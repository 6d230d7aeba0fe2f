//! Cached read and write operations over the organizational tree.
//!
//! Reads go through the cache-aside engine. Writes persist to the store,
//! then run the invalidation coordinator before returning.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;

use orgtree_core::cache::{
    person_key, Cache, CacheAside, CacheError, Result as CacheResult, ALL_GROUPS_KEY,
    ALL_PERSONS_KEY,
};
use orgtree_core::hierarchy::{
    validate_group_update, validate_new_group, validate_new_person, validate_person_update,
    AncestorNode, FilterCriteria, Group, GroupId, GroupUpdate, HierarchyError, NewGroup,
    NewPerson, Person, PersonId, PersonUpdate, Result, SubtreeNode, WriteKind,
};
use orgtree_core::storage::{GroupRepository, PersonRepository};

use super::ancestors::AncestorTraversal;
use super::invalidation::InvalidationCoordinator;
use super::subtree::SubtreeTraversal;

const HEALTH_PROBE_KEY: &str = "_healthz_probe";

pub struct HierarchyService {
    groups: Arc<dyn GroupRepository>,
    persons: Arc<dyn PersonRepository>,
    cache: CacheAside<dyn Cache>,
    ancestors: AncestorTraversal,
    subtree: SubtreeTraversal,
    invalidation: InvalidationCoordinator,
    /// Serializes group writes, and person writes that may reference a group,
    /// so a check and the write it guards see the same tree.
    group_writes: Mutex<()>,
}

impl HierarchyService {
    pub fn new(
        groups: Arc<dyn GroupRepository>,
        persons: Arc<dyn PersonRepository>,
        cache: Arc<dyn Cache>,
        ttl: Duration,
    ) -> Self {
        let cache = CacheAside::new(cache, ttl);
        Self {
            ancestors: AncestorTraversal::new(groups.clone(), cache.clone()),
            subtree: SubtreeTraversal::new(groups.clone(), persons.clone(), cache.clone()),
            invalidation: InvalidationCoordinator::new(groups.clone(), cache.clone()),
            groups,
            persons,
            cache,
            group_writes: Mutex::new(()),
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub async fn fetch_ancestors(&self, group_id: GroupId) -> Result<AncestorNode> {
        self.ancestors.fetch_ancestors(group_id).await
    }

    pub async fn fetch_subtree(
        &self,
        group_id: GroupId,
        filters: &FilterCriteria,
    ) -> Result<SubtreeNode> {
        self.subtree.fetch_subtree(group_id, filters).await
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        self.cache
            .get_or_compute(ALL_GROUPS_KEY, || async {
                self.groups.list_groups().await.map_err(HierarchyError::from)
            })
            .await
    }

    /// Reads a single group straight from the store.
    pub async fn get_group(&self, id: GroupId) -> Result<Group> {
        self.groups
            .get_group(id)
            .await?
            .ok_or_else(|| HierarchyError::group_not_found(id))
    }

    pub async fn list_persons(&self) -> Result<Vec<Person>> {
        self.cache
            .get_or_compute(ALL_PERSONS_KEY, || async {
                self.persons.list_persons().await.map_err(HierarchyError::from)
            })
            .await
    }

    pub async fn get_person(&self, id: PersonId) -> Result<Person> {
        self.cache
            .get_or_compute(&person_key(id), || async {
                self.persons
                    .get_person(id)
                    .await?
                    .ok_or_else(|| HierarchyError::person_not_found(id))
            })
            .await
    }

    /// Writes, reads back and removes a probe entry.
    pub async fn probe_cache(&self) -> CacheResult<()> {
        let store = self.cache.store();
        store
            .set(HEALTH_PROBE_KEY, b"ok", Some(Duration::from_secs(5)))
            .await?;
        let value = store.get(HEALTH_PROBE_KEY).await?;
        store.delete(HEALTH_PROBE_KEY).await?;

        match value.as_deref() {
            Some(b"ok") => Ok(()),
            _ => Err(CacheError::OperationFailed(
                "probe value was not read back".to_string(),
            )),
        }
    }

    // ------------------------------------------------------------------
    // Group writes
    // ------------------------------------------------------------------

    pub async fn create_group(&self, new_group: NewGroup) -> Result<Group> {
        validate_new_group(&new_group)?;

        let _guard = self.group_writes.lock().await;
        if let Some(parent_id) = new_group.parent_group_id {
            self.require_group_reference(parent_id, "Parent group").await?;
        }

        let group = self.groups.create_group(&new_group).await?;
        tracing::info!(group_id = group.id, name = %group.group_name, "Group created");

        self.invalidation
            .on_group_write(WriteKind::Create, group.id, None, group.parent_group_id)
            .await;
        Ok(group)
    }

    pub async fn update_group(&self, id: GroupId, update: GroupUpdate) -> Result<Group> {
        validate_group_update(&update)?;

        let _guard = self.group_writes.lock().await;
        let mut group = self.get_group(id).await?;
        let old_parent_id = group.parent_group_id;

        if let Some(Some(new_parent_id)) = update.parent_change(&group) {
            if new_parent_id != id {
                self.require_group_reference(new_parent_id, "Parent group").await?;
            }
            self.invalidation.ensure_acyclic(id, new_parent_id).await?;
        }

        update.apply_to(&mut group, Utc::now());
        self.groups.update_group(&group).await?;
        tracing::info!(group_id = id, name = %group.group_name, "Group updated");

        self.invalidation
            .on_group_write(WriteKind::Update, id, old_parent_id, group.parent_group_id)
            .await;
        Ok(group)
    }

    pub async fn delete_group(&self, id: GroupId) -> Result<()> {
        let _guard = self.group_writes.lock().await;
        let group = self.get_group(id).await?;
        let members: Vec<PersonId> = self
            .persons
            .get_persons_by_group(id, &FilterCriteria::new())
            .await?
            .iter()
            .map(|person| person.id)
            .collect();

        self.groups.delete_group(id).await?;
        tracing::info!(group_id = id, detached = members.len(), "Group deleted");

        self.invalidation
            .on_group_write(WriteKind::Delete, id, group.parent_group_id, None)
            .await;
        self.invalidation.on_members_detached(&members).await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Person writes
    // ------------------------------------------------------------------

    pub async fn create_person(&self, new_person: NewPerson) -> Result<Person> {
        validate_new_person(&new_person)?;

        let _guard = match new_person.group_id {
            Some(group_id) => {
                let guard = self.group_writes.lock().await;
                self.require_group_reference(group_id, "Group").await?;
                Some(guard)
            }
            None => None,
        };

        let person = self.persons.create_person(&new_person).await?;
        tracing::info!(person_id = person.id, "Person created");

        self.invalidation
            .on_person_write(WriteKind::Create, person.id, None, person.group_id)
            .await;
        Ok(person)
    }

    pub async fn update_person(&self, id: PersonId, update: PersonUpdate) -> Result<Person> {
        validate_person_update(&update)?;

        // The stored row may name a group that a concurrent delete is detaching
        let _guard = self.group_writes.lock().await;

        let mut person = self
            .persons
            .get_person(id)
            .await?
            .ok_or_else(|| HierarchyError::person_not_found(id))?;
        let old_group_id = person.group_id;

        if let Some(Some(group_id)) = update.group_id {
            if Some(group_id) != old_group_id {
                self.require_group_reference(group_id, "Group").await?;
            }
        }

        update.apply_to(&mut person, Utc::now());
        self.persons.update_person(&person).await?;
        tracing::info!(person_id = id, "Person updated");

        self.invalidation
            .on_person_write(WriteKind::Update, id, old_group_id, person.group_id)
            .await;
        Ok(person)
    }

    pub async fn delete_person(&self, id: PersonId) -> Result<()> {
        let person = self
            .persons
            .get_person(id)
            .await?
            .ok_or_else(|| HierarchyError::person_not_found(id))?;

        self.persons.delete_person(id).await?;
        tracing::info!(person_id = id, "Person deleted");

        self.invalidation
            .on_person_write(WriteKind::Delete, id, person.group_id, None)
            .await;
        Ok(())
    }

    /// Fails with a validation error if a referenced group does not exist.
    async fn require_group_reference(&self, id: GroupId, what: &str) -> Result<()> {
        match self.groups.get_group(id).await? {
            Some(_) => Ok(()),
            None => Err(HierarchyError::Validation(format!("{what} {id} does not exist"))),
        }
    }
}
