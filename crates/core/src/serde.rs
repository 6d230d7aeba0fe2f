//! Serde helper functions for request payload deserialization.
//!
//! JSON payloads distinguish between a missing field and an explicit `null`,
//! which matters for nullable references such as `parentGroupId`.

use serde::{Deserialize, Deserializer};

/// Deserialize an optional string, treating empty strings as None.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

/// Deserialize a field that may be absent, explicitly `null`, or set.
///
/// Use together with `#[serde(default)]`: an absent field yields `None`,
/// `null` yields `Some(None)` and a value yields `Some(Some(value))`.
pub fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
