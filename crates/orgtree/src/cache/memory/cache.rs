//! In-memory cache implementation with LRU eviction.
//!
//! Provides a thread-safe in-memory cache with TTL support using
//! tokio synchronization primitives and LRU eviction policy.
//!
//! This implementation mirrors the Redis cache behavior for consistency:
//! - Ancestor and subtree keys are tracked per key space so prefix sweeps
//!   only visit candidate keys
//! - Deleting, evicting or expiring a tracked key removes it from its
//!   tracking set
//! - Prefixes outside the tracked spaces fall back to a full scan

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;

use orgtree_core::cache::{prefix_matches, tracked_space, Cache, Result};

/// A single cache entry with optional expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|d| Instant::now() + d);
        Self { value, expires_at }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }
}

/// In-memory cache implementation with LRU eviction.
///
/// Supports TTL with lazy expiration (entries are dropped when read after
/// their deadline). Uses LRU eviction to limit memory usage when
/// `max_entries` is reached.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
    /// Maps a tracked key space prefix to the keys currently stored in it.
    tracking: Arc<RwLock<HashMap<&'static str, HashSet<String>>>>,
}

impl MemoryCache {
    /// Creates a new in-memory cache with LRU eviction.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is 0.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).expect("max_entries must be > 0");
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
            tracking: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Drops a key that already left the store from its tracking set.
    async fn untrack(&self, key: &str) {
        let Some(space) = tracked_space(key) else {
            return;
        };

        let mut tracking = self.tracking.write().await;
        if let Some(tracked) = tracking.get_mut(space) {
            tracked.remove(key);
            if tracked.is_empty() {
                tracking.remove(space);
            }
        }
    }

    /// Removes keys from the store and from their tracking set.
    async fn remove_tracked(&self, space: &'static str, keys: &[String]) {
        {
            let mut store = self.store.write().await;
            for key in keys {
                store.pop(key);
            }
        }

        let mut tracking = self.tracking.write().await;
        if let Some(tracked) = tracking.get_mut(space) {
            for key in keys {
                tracked.remove(key);
            }
            if tracked.is_empty() {
                tracking.remove(space);
            }
        }
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.store.write().await;

        match store.get(key) {
            Some(entry) if entry.is_expired() => {
                store.pop(key);
                drop(store);
                self.untrack(key).await;
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        // `push` hands back the evicted entry, or the replaced one for an existing key
        let evicted = {
            let mut store = self.store.write().await;
            store
                .push(key.to_string(), CacheEntry::new(value.to_vec(), ttl))
                .map(|(evicted_key, _)| evicted_key)
                .filter(|evicted_key| evicted_key != key)
        };

        if let Some(evicted_key) = evicted {
            self.untrack(&evicted_key).await;
        }

        if let Some(space) = tracked_space(key) {
            let mut tracking = self.tracking.write().await;
            tracking.entry(space).or_default().insert(key.to_string());
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if let Some(space) = tracked_space(key) {
            self.remove_tracked(space, &[key.to_string()]).await;
            return Ok(());
        }

        let mut store = self.store.write().await;
        store.pop(key);

        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<()> {
        let Some(space) = tracked_space(prefix) else {
            // Untracked prefix: O(n) scan of the whole store
            let mut store = self.store.write().await;
            let keys_to_delete: Vec<String> = store
                .iter()
                .filter(|(key, _)| prefix_matches(prefix, key))
                .map(|(key, _)| key.clone())
                .collect();
            for key in &keys_to_delete {
                store.pop(key);
            }
            drop(store);

            let mut tracking = self.tracking.write().await;
            for tracked in tracking.values_mut() {
                tracked.retain(|key| !prefix_matches(prefix, key));
            }
            tracking.retain(|_, tracked| !tracked.is_empty());
            return Ok(());
        };

        let keys_to_delete: Vec<String> = {
            let tracking = self.tracking.read().await;
            tracking
                .get(space)
                .map(|keys| {
                    keys.iter()
                        .filter(|k| prefix_matches(prefix, k))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };

        if !keys_to_delete.is_empty() {
            self.remove_tracked(space, &keys_to_delete).await;
        }

        Ok(())
    }
}
