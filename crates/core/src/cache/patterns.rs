//! Pure prefix-matching functions for cache keys.
//!
//! Ancestor and subtree keys are swept by prefix on every structural write.
//! Backends track the members of these key spaces so a sweep only touches
//! keys that can match.

use super::keys::{ANCESTORS_PREFIX, SUBTREE_PREFIX};

/// Key spaces whose members are tracked for prefix deletion.
pub const TRACKED_SPACES: [&str; 2] = [ANCESTORS_PREFIX, SUBTREE_PREFIX];

/// Checks if a cache key starts with a prefix. The empty prefix matches every key.
pub fn prefix_matches(prefix: &str, key: &str) -> bool {
    key.starts_with(prefix)
}

/// Returns the tracked key space that contains `key_or_prefix`.
///
/// For a key this is the space the key belongs to. For a prefix it is the
/// space that holds every key the prefix can match, so `"groups_below_5_"`
/// resolves to the subtree space. Prefixes broader than a space (such as
/// `"group"`) resolve to `None`.
///
/// # Examples
///
/// ```
/// use orgtree_core::cache::tracked_space;
///
/// assert_eq!(tracked_space("group_above_3"), Some("group_above_"));
/// assert_eq!(tracked_space("groups_below_"), Some("groups_below_"));
/// assert_eq!(tracked_space("person_id_1"), None);
/// ```
pub fn tracked_space(key_or_prefix: &str) -> Option<&'static str> {
    TRACKED_SPACES
        .into_iter()
        .find(|space| key_or_prefix.starts_with(space))
}
