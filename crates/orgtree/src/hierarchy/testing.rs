//! Counting test doubles for the hierarchy service.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use orgtree_core::cache::{prefix_matches, Cache, Result as CacheResult};
use orgtree_core::hierarchy::{
    FilterCriteria, Group, GroupId, NewGroup, NewPerson, Person, PersonId,
};
use orgtree_core::storage::{GroupRepository, PersonRepository, RepositoryError, Result};

/// Repository double that counts reads and can be switched into failure mode.
#[derive(Default)]
pub struct MockStore {
    groups: RwLock<BTreeMap<GroupId, Group>>,
    persons: RwLock<BTreeMap<PersonId, Person>>,
    pub get_group_calls: AtomicUsize,
    pub child_calls: AtomicUsize,
    pub persons_by_group_calls: AtomicUsize,
    pub list_groups_calls: AtomicUsize,
    pub get_person_calls: AtomicUsize,
    pub touched: std::sync::Mutex<Vec<GroupId>>,
    pub failing: AtomicBool,
    /// Groups still listed as children but no longer readable by id.
    unreadable: std::sync::Mutex<HashSet<GroupId>>,
}

impl MockStore {
    /// Root(1) with Child(2); Alice (eng) and Bob (sales) in group 2.
    pub async fn scenario() -> Arc<Self> {
        let store = Arc::new(Self::default());
        store.insert_group(Group::new(1, "Root")).await;
        store.insert_group(Group::new(2, "Child").with_parent(1)).await;
        store
            .insert_person(Person::new(1, "Alice", "Smith", "eng").in_group(2))
            .await;
        store
            .insert_person(Person::new(2, "Bob", "Jones", "sales").in_group(2))
            .await;
        store
    }

    pub async fn insert_group(&self, group: Group) {
        self.groups.write().await.insert(group.id, group);
    }

    pub async fn insert_person(&self, person: Person) {
        self.persons.write().await.insert(person.id, person);
    }

    pub async fn group(&self, id: GroupId) -> Option<Group> {
        self.groups.read().await.get(&id).cloned()
    }

    /// Inserts a linear chain `1 -> 2 -> ... -> depth`.
    pub async fn chain(depth: GroupId) -> Arc<Self> {
        let store = Arc::new(Self::default());
        store.insert_group(Group::new(1, "Level 1")).await;
        for id in 2..=depth {
            store
                .insert_group(Group::new(id, format!("Level {id}")).with_parent(id - 1))
                .await;
        }
        store
    }

    /// Makes `get_group` report `id` as absent while child listings keep it.
    pub fn make_unreadable(&self, id: GroupId) {
        if let Ok(mut unreadable) = self.unreadable.lock() {
            unreadable.insert(id);
        }
    }

    fn is_unreadable(&self, id: GroupId) -> bool {
        self.unreadable
            .lock()
            .map(|unreadable| unreadable.contains(&id))
            .unwrap_or(false)
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.get_group_calls.load(Ordering::SeqCst)
            + self.child_calls.load(Ordering::SeqCst)
            + self.persons_by_group_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RepositoryError::ConnectionFailed("store unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl GroupRepository for MockStore {
    async fn get_group(&self, id: GroupId) -> Result<Option<Group>> {
        self.get_group_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        if self.is_unreadable(id) {
            return Ok(None);
        }
        Ok(self.groups.read().await.get(&id).cloned())
    }

    async fn get_child_groups(&self, parent_id: GroupId) -> Result<Vec<Group>> {
        self.child_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .groups
            .read()
            .await
            .values()
            .filter(|g| g.parent_group_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        self.list_groups_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.groups.read().await.values().cloned().collect())
    }

    async fn create_group(&self, group: &NewGroup) -> Result<Group> {
        let mut groups = self.groups.write().await;
        let id = groups.keys().next_back().copied().unwrap_or(0) + 1;
        let mut stored = Group::new(id, group.group_name.clone());
        stored.parent_group_id = group.parent_group_id;
        groups.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_group(&self, group: &Group) -> Result<()> {
        self.groups.write().await.insert(group.id, group.clone());
        Ok(())
    }

    async fn delete_group(&self, id: GroupId) -> Result<()> {
        let mut groups = self.groups.write().await;
        groups.remove(&id);
        for child in groups.values_mut().filter(|g| g.parent_group_id == Some(id)) {
            child.parent_group_id = None;
        }
        for person in self
            .persons
            .write()
            .await
            .values_mut()
            .filter(|p| p.group_id == Some(id))
        {
            person.group_id = None;
        }
        Ok(())
    }

    async fn touch_group(&self, id: GroupId, at: DateTime<Utc>) -> Result<()> {
        if let Ok(mut touched) = self.touched.lock() {
            touched.push(id);
        }
        if let Some(group) = self.groups.write().await.get_mut(&id) {
            group.updated_at = at;
        }
        Ok(())
    }
}

#[async_trait]
impl PersonRepository for MockStore {
    async fn get_person(&self, id: PersonId) -> Result<Option<Person>> {
        self.get_person_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.persons.read().await.get(&id).cloned())
    }

    async fn list_persons(&self) -> Result<Vec<Person>> {
        self.check()?;
        Ok(self.persons.read().await.values().cloned().collect())
    }

    async fn get_persons_by_group(
        &self,
        group_id: GroupId,
        filters: &FilterCriteria,
    ) -> Result<Vec<Person>> {
        self.persons_by_group_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .persons
            .read()
            .await
            .values()
            .filter(|p| p.group_id == Some(group_id) && filters.matches(p))
            .cloned()
            .collect())
    }

    async fn create_person(&self, person: &NewPerson) -> Result<Person> {
        let mut persons = self.persons.write().await;
        let id = persons.keys().next_back().copied().unwrap_or(0) + 1;
        let mut stored = Person::new(
            id,
            person.first_name.clone(),
            person.last_name.clone(),
            person.job_title.clone(),
        );
        stored.group_id = person.group_id;
        persons.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_person(&self, person: &Person) -> Result<()> {
        self.persons.write().await.insert(person.id, person.clone());
        Ok(())
    }

    async fn delete_person(&self, id: PersonId) -> Result<()> {
        self.persons.write().await.remove(&id);
        Ok(())
    }
}

/// HashMap-backed cache.
#[derive(Default)]
pub struct MockCache {
    store: RwLock<HashMap<String, Vec<u8>>>,
}

impl MockCache {
    pub async fn contains(&self, key: &str) -> bool {
        self.store.read().await.contains_key(key)
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.store.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl Cache for MockCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(self.store.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
        self.store
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.store.write().await.remove(key);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> CacheResult<()> {
        self.store
            .write()
            .await
            .retain(|k, _| !prefix_matches(prefix, k));
        Ok(())
    }
}
