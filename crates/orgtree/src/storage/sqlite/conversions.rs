//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access.

use chrono::{DateTime, Utc};
use rusqlite::Row;

use orgtree_core::hierarchy::{Group, Person};

/// Convert a SQLite row to a Group.
///
/// Expected columns: id, group_name, parent_group_id, created_at, updated_at
pub fn row_to_group(row: &Row) -> rusqlite::Result<Group> {
    let created_at: String = row.get(3)?;
    let updated_at: String = row.get(4)?;

    Ok(Group {
        id: row.get(0)?,
        group_name: row.get(1)?,
        parent_group_id: row.get(2)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

/// Convert a SQLite row to a Person.
///
/// Expected columns: id, first_name, last_name, job_title, group_id, created_at, updated_at
pub fn row_to_person(row: &Row) -> rusqlite::Result<Person> {
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    Ok(Person {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        job_title: row.get(3)?,
        group_id: row.get(4)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

/// Parse an RFC 3339 timestamp stored as text.
pub fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Format a DateTime<Utc> for SQLite storage (RFC 3339).
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}
