//! Pure functions for mapping hierarchy errors to HTTP status codes.

use super::HierarchyError;
use crate::storage::RepositoryError;

/// Maps a [`HierarchyError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - `StructuralConflict` -> 400 (Bad Request)
/// - `Validation` -> 400 (Bad Request)
/// - `Compute` -> 503 when the store is unreachable, 400 for a refused row, else 500
///
/// # Examples
///
/// ```
/// use orgtree_core::hierarchy::{hierarchy_error_to_status_code, HierarchyError};
///
/// assert_eq!(hierarchy_error_to_status_code(&HierarchyError::group_not_found(42)), 404);
/// ```
pub fn hierarchy_error_to_status_code(error: &HierarchyError) -> u16 {
    match error {
        HierarchyError::NotFound { .. } => 404,
        HierarchyError::StructuralConflict { .. } => 400,
        HierarchyError::Validation(_) => 400,
        HierarchyError::Compute(inner) => store_failure_status(inner),
    }
}

/// Status for a store failure met while serving a request.
///
/// A missing row here is a store anomaly rather than a client error, so it
/// maps to 500 like any failed query. An unreachable store is 503 and a row
/// the store refused is 400.
fn store_failure_status(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::ConnectionFailed(_) => 503,
        RepositoryError::InvalidData(_) => 400,
        RepositoryError::NotFound { .. } | RepositoryError::QueryFailed(_) => 500,
    }
}
