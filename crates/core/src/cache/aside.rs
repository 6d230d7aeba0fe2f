//! Generic cache-aside engine.
//!
//! [`CacheAside::get_or_compute`] consults the cache first and, on a miss,
//! runs the supplied computation and stores its result. Only successful
//! computations are stored, so a failure is retried on the next call.
//!
//! There is no per-key single-flight: two concurrent misses for the same key
//! may both run their computation and both store the result. Computations
//! passed here are deterministic reads, so the duplicate work is wasted but
//! never incorrect.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use super::serialization::{deserialize_value, serialize_value};
use super::{Cache, Result};

/// Default time-to-live of computed entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Compute-or-fetch memoization over an injected cache store.
pub struct CacheAside<C: ?Sized> {
    cache: Arc<C>,
    ttl: Duration,
}

impl<C: ?Sized> Clone for CacheAside<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            ttl: self.ttl,
        }
    }
}

impl<C> CacheAside<C>
where
    C: Cache + ?Sized,
{
    /// Creates a new engine storing entries with the given TTL.
    pub fn new(cache: Arc<C>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Returns the TTL applied to stored entries.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the underlying cache store.
    pub fn store(&self) -> &Arc<C> {
        &self.cache
    }

    /// Returns the cached value for `key`, or computes, stores and returns it.
    ///
    /// Cache read failures and undecodable entries are treated as misses.
    /// A failure to store the computed value is logged and the value is still
    /// returned. Errors from `compute` are returned unchanged and nothing is
    /// stored.
    pub async fn get_or_compute<T, E, F, Fut>(&self, key: &str, compute: F) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        match self.cache.get(key).await {
            Ok(Some(bytes)) => match deserialize_value::<T>(&bytes) {
                Ok(value) => {
                    tracing::trace!(key, "Cache hit");
                    return Ok(value);
                }
                Err(err) => {
                    tracing::warn!(key, error = %err, "Cached value deserialization failed");
                }
            },
            Ok(None) => tracing::trace!(key, "Cache miss"),
            Err(err) => tracing::warn!(key, error = %err, "Cache read failed, recomputing"),
        }

        let value = compute().await?;

        match serialize_value(&value) {
            Ok(bytes) => {
                if let Err(err) = self.cache.set(key, &bytes, Some(self.ttl)).await {
                    tracing::warn!(key, error = %err, "Failed to cache computed value");
                }
            }
            Err(err) => tracing::warn!(key, error = %err, "Failed to serialize computed value"),
        }

        Ok(value)
    }

    /// Removes a single entry. Missing keys are a no-op.
    pub async fn invalidate(&self, key: &str) -> Result<()> {
        self.cache.delete(key).await
    }

    /// Removes every entry whose key starts with `prefix`. Zero matches is a no-op.
    pub async fn invalidate_prefix(&self, prefix: &str) -> Result<()> {
        self.cache.delete_prefix(prefix).await
    }
}
