//! SQLite schema definitions and SQL query constants.
//!
//! This module contains all SQL statements used by the SQLite repository,
//! following the Functional Core pattern - pure data, no I/O.

use orgtree_core::hierarchy::{FilterCriteria, PersonFilter};

/// SQL statement to create all tables.
///
/// Foreign keys are enabled per connection so that deleting a group
/// detaches its children and persons instead of leaving dangling IDs.
pub const CREATE_TABLES: &str = r#"
PRAGMA foreign_keys = ON;

-- Groups table (self-referencing parent pointer)
CREATE TABLE IF NOT EXISTS groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    group_name TEXT NOT NULL,
    parent_group_id INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (parent_group_id) REFERENCES groups(id) ON DELETE SET NULL
);

-- Persons table
CREATE TABLE IF NOT EXISTS persons (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    job_title TEXT NOT NULL,
    group_id INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (group_id) REFERENCES groups(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_groups_parent_group_id ON groups(parent_group_id);
CREATE INDEX IF NOT EXISTS idx_persons_group_id ON persons(group_id);
"#;

// Group queries
pub const INSERT_GROUP: &str = r#"
INSERT INTO groups (group_name, parent_group_id, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4)
"#;

pub const SELECT_GROUP_BY_ID: &str = r#"
SELECT id, group_name, parent_group_id, created_at, updated_at
FROM groups
WHERE id = ?1
"#;

pub const SELECT_GROUPS_BY_PARENT: &str = r#"
SELECT id, group_name, parent_group_id, created_at, updated_at
FROM groups
WHERE parent_group_id = ?1
ORDER BY id ASC
"#;

pub const SELECT_ALL_GROUPS: &str = r#"
SELECT id, group_name, parent_group_id, created_at, updated_at
FROM groups
ORDER BY id ASC
"#;

pub const UPDATE_GROUP: &str = r#"
UPDATE groups
SET group_name = ?2, parent_group_id = ?3, updated_at = ?4
WHERE id = ?1
"#;

pub const TOUCH_GROUP: &str = r#"
UPDATE groups
SET updated_at = ?2
WHERE id = ?1
"#;

pub const DELETE_GROUP: &str = r#"
DELETE FROM groups
WHERE id = ?1
"#;

// Person queries
pub const INSERT_PERSON: &str = r#"
INSERT INTO persons (first_name, last_name, job_title, group_id, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub const SELECT_PERSON_BY_ID: &str = r#"
SELECT id, first_name, last_name, job_title, group_id, created_at, updated_at
FROM persons
WHERE id = ?1
"#;

pub const SELECT_ALL_PERSONS: &str = r#"
SELECT id, first_name, last_name, job_title, group_id, created_at, updated_at
FROM persons
ORDER BY id ASC
"#;

pub const UPDATE_PERSON: &str = r#"
UPDATE persons
SET first_name = ?2, last_name = ?3, job_title = ?4, group_id = ?5, updated_at = ?6
WHERE id = ?1
"#;

pub const DELETE_PERSON: &str = r#"
DELETE FROM persons
WHERE id = ?1
"#;

const SELECT_PERSONS_BY_GROUP: &str = "SELECT id, first_name, last_name, job_title, group_id, created_at, updated_at FROM persons WHERE group_id = ?1";

fn filter_column(filter: &PersonFilter) -> &'static str {
    match filter {
        PersonFilter::JobTitle(_) => "job_title",
        PersonFilter::FirstName(_) => "first_name",
    }
}

/// Builds the filtered person query for a group.
///
/// Returns the SQL and the text parameters that follow the group ID (`?1`),
/// one per predicate, bound positionally from `?2`.
pub fn select_persons_by_group(filters: &FilterCriteria) -> (String, Vec<String>) {
    let mut sql = SELECT_PERSONS_BY_GROUP.to_string();
    let mut params = Vec::with_capacity(filters.len());

    for (index, filter) in filters.iter().enumerate() {
        sql.push_str(&format!(" AND {} = ?{}", filter_column(filter), index + 2));
        params.push(filter.value().to_string());
    }
    sql.push_str(" ORDER BY id ASC");

    (sql, params)
}
