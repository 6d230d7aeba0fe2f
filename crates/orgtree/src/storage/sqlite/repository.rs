//! SQLite repository implementation.
//!
//! Implements the repository traits from `orgtree_core::storage` using SQLite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use tokio_rusqlite::Connection;

use orgtree_core::hierarchy::{
    FilterCriteria, Group, GroupId, NewGroup, NewPerson, Person, PersonId,
};
use orgtree_core::storage::{GroupRepository, PersonRepository, RepositoryError, Result};

use super::conversions::{format_datetime, row_to_group, row_to_person};
use super::error::{map_tokio_rusqlite_error, map_tokio_rusqlite_error_with_id};
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Fails with `QueryReturnedNoRows` when a statement touched nothing.
fn expect_affected(rows: usize) -> std::result::Result<(), tokio_rusqlite::Error> {
    if rows == 0 {
        Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
    } else {
        Ok(())
    }
}

/// SQLite-based repository implementation.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    async fn select_groups(
        &self,
        sql: &'static str,
        params: Vec<Value>,
    ) -> Result<Vec<Group>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(sql).map_err(wrap_err)?;
                let rows = stmt
                    .query_map(rusqlite::params_from_iter(params), row_to_group)
                    .map_err(wrap_err)?;

                let mut groups = Vec::new();
                for row_result in rows {
                    groups.push(row_result.map_err(wrap_err)?);
                }
                Ok(groups)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Group"))
    }

    async fn select_persons(&self, sql: String, params: Vec<Value>) -> Result<Vec<Person>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(wrap_err)?;
                let rows = stmt
                    .query_map(rusqlite::params_from_iter(params), row_to_person)
                    .map_err(wrap_err)?;

                let mut persons = Vec::new();
                for row_result in rows {
                    persons.push(row_result.map_err(wrap_err)?);
                }
                Ok(persons)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Person"))
    }
}

// ============================================================================
// GroupRepository implementation
// ============================================================================

#[async_trait]
impl GroupRepository for SqliteRepository {
    async fn get_group(&self, id: GroupId) -> Result<Option<Group>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_GROUP_BY_ID).map_err(wrap_err)?;
                match stmt.query_row([id], row_to_group) {
                    Ok(group) => Ok(Some(group)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Group", id))
    }

    async fn get_child_groups(&self, parent_id: GroupId) -> Result<Vec<Group>> {
        self.select_groups(
            schema::SELECT_GROUPS_BY_PARENT,
            vec![Value::Integer(parent_id)],
        )
        .await
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        self.select_groups(schema::SELECT_ALL_GROUPS, Vec::new())
            .await
    }

    async fn create_group(&self, group: &NewGroup) -> Result<Group> {
        let now = Utc::now();
        let mut stored = Group {
            id: 0,
            group_name: group.group_name.clone(),
            parent_group_id: group.parent_group_id,
            created_at: now,
            updated_at: now,
        };
        let group_name = stored.group_name.clone();
        let parent_group_id = stored.parent_group_id;
        let timestamp = format_datetime(&now);

        stored.id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_GROUP,
                    rusqlite::params![group_name, parent_group_id, timestamp, timestamp],
                )
                .map_err(wrap_err)?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Group"))?;

        Ok(stored)
    }

    async fn update_group(&self, group: &Group) -> Result<()> {
        let id = group.id;
        let group_name = group.group_name.clone();
        let parent_group_id = group.parent_group_id;
        let updated_at = format_datetime(&group.updated_at);

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_GROUP,
                        rusqlite::params![id, group_name, parent_group_id, updated_at],
                    )
                    .map_err(wrap_err)?;
                expect_affected(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Group", id))
    }

    async fn delete_group(&self, id: GroupId) -> Result<()> {
        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::DELETE_GROUP, [id])
                    .map_err(wrap_err)?;
                expect_affected(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Group", id))
    }

    async fn touch_group(&self, id: GroupId, at: DateTime<Utc>) -> Result<()> {
        let updated_at = format_datetime(&at);

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::TOUCH_GROUP, rusqlite::params![id, updated_at])
                    .map_err(wrap_err)?;
                expect_affected(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Group", id))
    }
}

// ============================================================================
// PersonRepository implementation
// ============================================================================

#[async_trait]
impl PersonRepository for SqliteRepository {
    async fn get_person(&self, id: PersonId) -> Result<Option<Person>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_PERSON_BY_ID).map_err(wrap_err)?;
                match stmt.query_row([id], row_to_person) {
                    Ok(person) => Ok(Some(person)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Person", id))
    }

    async fn list_persons(&self) -> Result<Vec<Person>> {
        self.select_persons(schema::SELECT_ALL_PERSONS.to_string(), Vec::new())
            .await
    }

    async fn get_persons_by_group(
        &self,
        group_id: GroupId,
        filters: &FilterCriteria,
    ) -> Result<Vec<Person>> {
        let (sql, filter_params) = schema::select_persons_by_group(filters);
        let params = std::iter::once(Value::Integer(group_id))
            .chain(filter_params.into_iter().map(Value::Text))
            .collect();

        self.select_persons(sql, params).await
    }

    async fn create_person(&self, person: &NewPerson) -> Result<Person> {
        let now = Utc::now();
        let mut stored = Person {
            id: 0,
            first_name: person.first_name.clone(),
            last_name: person.last_name.clone(),
            job_title: person.job_title.clone(),
            group_id: person.group_id,
            created_at: now,
            updated_at: now,
        };
        let first_name = stored.first_name.clone();
        let last_name = stored.last_name.clone();
        let job_title = stored.job_title.clone();
        let group_id = stored.group_id;
        let timestamp = format_datetime(&now);

        stored.id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_PERSON,
                    rusqlite::params![first_name, last_name, job_title, group_id, timestamp, timestamp],
                )
                .map_err(wrap_err)?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Person"))?;

        Ok(stored)
    }

    async fn update_person(&self, person: &Person) -> Result<()> {
        let id = person.id;
        let first_name = person.first_name.clone();
        let last_name = person.last_name.clone();
        let job_title = person.job_title.clone();
        let group_id = person.group_id;
        let updated_at = format_datetime(&person.updated_at);

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_PERSON,
                        rusqlite::params![id, first_name, last_name, job_title, group_id, updated_at],
                    )
                    .map_err(wrap_err)?;
                expect_affected(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Person", id))
    }

    async fn delete_person(&self, id: PersonId) -> Result<()> {
        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::DELETE_PERSON, [id])
                    .map_err(wrap_err)?;
                expect_affected(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Person", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgtree_core::hierarchy::PersonFilter;

    async fn seeded() -> SqliteRepository {
        let repo = SqliteRepository::new_in_memory().await.unwrap();
        let root = repo.create_group(&NewGroup::new("Root", None)).await.unwrap();
        let child = repo
            .create_group(&NewGroup::new("Child", Some(root.id)))
            .await
            .unwrap();
        repo.create_person(&NewPerson::new("Alice", "Smith", "eng", Some(child.id)))
            .await
            .unwrap();
        repo.create_person(&NewPerson::new("Bob", "Jones", "sales", Some(child.id)))
            .await
            .unwrap();
        repo
    }

    #[tokio::test]
    async fn test_create_and_get_group() {
        let repo = seeded().await;

        let root = repo.get_group(1).await.unwrap().unwrap();
        assert_eq!(root.group_name, "Root");
        assert!(root.is_root());

        let child = repo.get_group(2).await.unwrap().unwrap();
        assert_eq!(child.parent_group_id, Some(1));

        assert!(repo.get_group(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_child_groups_and_list() {
        let repo = seeded().await;

        let children = repo.get_child_groups(1).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, 2);

        let all = repo.list_groups().await.unwrap();
        assert_eq!(all.iter().map(|g| g.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_get_persons_by_group_with_filters() {
        let repo = seeded().await;

        let all = repo
            .get_persons_by_group(2, &FilterCriteria::new())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let filters = FilterCriteria::new()
            .with(PersonFilter::JobTitle("eng".into()))
            .with(PersonFilter::FirstName("Alice".into()));
        let matching = repo.get_persons_by_group(2, &filters).await.unwrap();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].last_name, "Smith");

        let none = repo
            .get_persons_by_group(2, &FilterCriteria::new().with(PersonFilter::FirstName("Zed".into())))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_update_group_reparents() {
        let repo = seeded().await;
        let other = repo.create_group(&NewGroup::new("Other", None)).await.unwrap();

        let mut child = repo.get_group(2).await.unwrap().unwrap();
        child.parent_group_id = Some(other.id);
        repo.update_group(&child).await.unwrap();

        assert_eq!(
            repo.get_group(2).await.unwrap().unwrap().parent_group_id,
            Some(other.id)
        );
    }

    #[tokio::test]
    async fn test_update_missing_group_is_not_found() {
        let repo = SqliteRepository::new_in_memory().await.unwrap();
        let result = repo.update_group(&Group::new(7, "Ghost")).await;
        assert_eq!(
            result,
            Err(RepositoryError::NotFound {
                entity_type: "Group",
                id: "7".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_delete_group_detaches_children_and_persons() {
        let repo = seeded().await;

        repo.delete_group(1).await.unwrap();
        assert!(repo.get_group(1).await.unwrap().is_none());
        assert_eq!(repo.get_group(2).await.unwrap().unwrap().parent_group_id, None);

        repo.delete_group(2).await.unwrap();
        let persons = repo.list_persons().await.unwrap();
        assert_eq!(persons.len(), 2);
        assert!(persons.iter().all(|p| p.group_id.is_none()));
    }

    #[tokio::test]
    async fn test_unknown_parent_is_rejected_by_foreign_key() {
        let repo = SqliteRepository::new_in_memory().await.unwrap();
        let result = repo.create_group(&NewGroup::new("Orphan", Some(42))).await;
        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_person_crud() {
        let repo = seeded().await;

        let mut alice = repo.get_person(1).await.unwrap().unwrap();
        alice.job_title = "manager".to_string();
        alice.group_id = Some(1);
        repo.update_person(&alice).await.unwrap();

        let reloaded = repo.get_person(1).await.unwrap().unwrap();
        assert_eq!(reloaded.job_title, "manager");
        assert_eq!(reloaded.group_id, Some(1));

        repo.delete_person(1).await.unwrap();
        assert!(repo.get_person(1).await.unwrap().is_none());
        assert!(repo.delete_person(1).await.is_err());
    }

    #[tokio::test]
    async fn test_touch_group() {
        let repo = seeded().await;
        let at = Utc::now() + chrono::Duration::hours(2);

        repo.touch_group(2, at).await.unwrap();

        let group = repo.get_group(2).await.unwrap().unwrap();
        assert_eq!(group.updated_at.timestamp(), at.timestamp());
    }
}
