use thiserror::Error;

use super::types::GroupId;
use crate::storage::RepositoryError;

/// Errors surfaced by the hierarchy traversals and write operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: &'static str, id: i64 },
    #[error("Group {group_id} cannot be moved under group {parent_id}: it would create a cycle")]
    StructuralConflict {
        group_id: GroupId,
        parent_id: GroupId,
    },
    #[error("Computation failed: {0}")]
    Compute(#[from] RepositoryError),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl HierarchyError {
    pub fn group_not_found(id: GroupId) -> Self {
        Self::NotFound {
            entity_type: "Group",
            id,
        }
    }

    pub fn person_not_found(id: i64) -> Self {
        Self::NotFound {
            entity_type: "Person",
            id,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors that can occur when parsing filter predicates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown filter field: {0}")]
    UnknownField(String),
}

/// Errors that can occur when validating groups and persons.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Group name cannot be empty")]
    EmptyGroupName,
    #[error("Group name too long (max 100 characters)")]
    GroupNameTooLong,
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),
    #[error("{0} too long (max 100 characters)")]
    FieldTooLong(&'static str),
}

impl From<ValidationError> for HierarchyError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<FilterError> for HierarchyError {
    fn from(err: FilterError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result type for hierarchy operations.
pub type Result<T> = std::result::Result<T, HierarchyError>;
