//! Cache key builders.
//!
//! The key shapes are shared with any cache contents written by earlier
//! deployments and must stay byte-for-byte stable.

use crate::hierarchy::{FilterCriteria, GroupId, PersonId};

/// Key of the cached list of every person.
pub const ALL_PERSONS_KEY: &str = "all_persons";

/// Key of the cached list of every group.
pub const ALL_GROUPS_KEY: &str = "all_groups";

/// Prefix shared by every ancestor-chain key.
pub const ANCESTORS_PREFIX: &str = "group_above_";

/// Prefix shared by every subtree key.
pub const SUBTREE_PREFIX: &str = "groups_below_";

/// Returns the cache key for a single person.
pub fn person_key(person_id: PersonId) -> String {
    format!("person_id_{}", person_id)
}

/// Returns the cache key for the ancestor chain of a group.
pub fn ancestors_key(group_id: GroupId) -> String {
    format!("{}{}", ANCESTORS_PREFIX, group_id)
}

/// Returns the cache key for the filtered subtree rooted at a group.
///
/// The filter JSON is embedded verbatim, so predicate order is part of the key.
pub fn subtree_key(group_id: GroupId, filters: &FilterCriteria) -> String {
    format!("{}{}_{}", SUBTREE_PREFIX, group_id, filters.to_json())
}

/// Returns the key of the set that tracks every cached key of a key space.
///
/// Backends that cannot enumerate keys cheaply use this set to resolve
/// prefix deletions.
pub fn tracking_key(space_prefix: &str) -> String {
    format!("_keys:{}", space_prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::PersonFilter;

    #[test]
    fn test_person_key() {
        assert_eq!(person_key(42), "person_id_42");
    }

    #[test]
    fn test_ancestors_key() {
        assert_eq!(ancestors_key(7), "group_above_7");
    }

    #[test]
    fn test_subtree_key_without_filters() {
        assert_eq!(subtree_key(1, &FilterCriteria::new()), "groups_below_1_[]");
    }

    #[test]
    fn test_subtree_key_with_filters() {
        let filters = FilterCriteria::new()
            .with(PersonFilter::JobTitle("eng".into()))
            .with(PersonFilter::FirstName("Alice".into()));
        assert_eq!(
            subtree_key(3, &filters),
            r#"groups_below_3_[{"jobTitle":"eng"},{"firstName":"Alice"}]"#
        );
    }

    #[test]
    fn test_subtree_key_is_order_sensitive() {
        let a = FilterCriteria::new()
            .with(PersonFilter::JobTitle("eng".into()))
            .with(PersonFilter::FirstName("Alice".into()));
        let b = FilterCriteria::new()
            .with(PersonFilter::FirstName("Alice".into()))
            .with(PersonFilter::JobTitle("eng".into()));
        assert_ne!(subtree_key(1, &a), subtree_key(1, &b));
        assert_eq!(
            subtree_key(1, &a.canonicalized()),
            subtree_key(1, &b.canonicalized())
        );
    }

    #[test]
    fn test_keys_fall_under_their_prefixes() {
        assert!(ancestors_key(1).starts_with(ANCESTORS_PREFIX));
        assert!(subtree_key(1, &FilterCriteria::new()).starts_with(SUBTREE_PREFIX));
    }

    #[test]
    fn test_tracking_key() {
        assert_eq!(tracking_key(SUBTREE_PREFIX), "_keys:groups_below_");
    }
}
