//! Pure functions for serializing/deserializing cached values.
//!
//! Values are stored as JSON, which keeps cache contents human-readable and
//! compatible with the wire shapes returned to clients. Deep hierarchies nest
//! two JSON levels per group, so decoding lifts serde_json's recursion limit
//! and grows the stack on demand instead.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during cache serialization/deserialization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to serialize a value to bytes.
    #[error("Failed to serialize: {0}")]
    SerializeFailed(String),
    /// Failed to deserialize bytes to a value.
    #[error("Failed to deserialize: {0}")]
    DeserializeFailed(String),
}

/// Result type for serialization operations.
pub type Result<T> = std::result::Result<T, SerializationError>;

/// Serializes a value to JSON bytes.
pub fn serialize_value<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes to a value.
pub fn deserialize_value<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let failed = |e: serde_json::Error| SerializationError::DeserializeFailed(e.to_string());

    let mut json = serde_json::Deserializer::from_slice(bytes);
    json.disable_recursion_limit();

    let value = T::deserialize(serde_stacker::Deserializer::new(&mut json)).map_err(failed)?;
    json.end().map_err(failed)?;

    Ok(value)
}
