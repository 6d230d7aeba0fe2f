mod aside;
mod error;
mod keys;
mod patterns;
mod serialization;
mod traits;

pub use aside::{CacheAside, DEFAULT_TTL};
pub use error::{CacheError, Result};
pub use keys::{
    ancestors_key, person_key, subtree_key, tracking_key, ALL_GROUPS_KEY, ALL_PERSONS_KEY,
    ANCESTORS_PREFIX, SUBTREE_PREFIX,
};
pub use patterns::{prefix_matches, tracked_space, TRACKED_SPACES};
pub use serialization::{deserialize_value, serialize_value, SerializationError};
pub use traits::Cache;
