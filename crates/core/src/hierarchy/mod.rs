mod error;
mod filters;
mod http_mapping;
mod index;
mod operations;
mod types;

pub use error::{FilterError, HierarchyError, Result, ValidationError};
pub use filters::{FilterCriteria, PersonFilter};
pub use http_mapping::hierarchy_error_to_status_code;
pub use index::GroupIndex;
pub use operations::{
    validate_group_update, validate_new_group, validate_new_person, validate_person_update,
};
pub use types::{
    AncestorNode, Group, GroupId, GroupUpdate, NewGroup, NewPerson, Person, PersonId,
    PersonUpdate, SubtreeNode, WriteKind,
};
