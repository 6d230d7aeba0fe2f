use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Trait for basic cache store operations.
///
/// Each operation is atomic for a single key. Composite operations such as
/// [`Cache::delete_prefix`] are not atomic with respect to concurrent writers.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a live value from the cache by key. Expired entries read as `None`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes a value from the cache by key. Missing keys are a no-op.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Deletes every value whose key starts with `prefix`. Zero matches is a no-op.
    async fn delete_prefix(&self, prefix: &str) -> Result<()>;
}
