//! Redis cache implementation.
//!
//! Uses set-based key tracking for prefix deletion without SCAN. Every key
//! in a tracked space (ancestor chains, subtrees) is added to the Redis Set
//! returned by [`tracking_key`] for that space. Prefixes outside the tracked
//! spaces fall back to `SCAN MATCH`.
//!
//! # Consistency
//!
//! `set` registers the key in its tracking set and writes the value inside
//! one `MULTI`/`EXEC` transaction, so a stored value is always reachable by
//! a sweep. A tracking set may still reference keys that expired or were
//! removed by a crash mid-sweep. Reads that miss on a tracked key prune it,
//! and DEL and SREM on missing members are no-ops, so such leftovers only
//! cost set space.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use orgtree_core::cache::{
    prefix_matches, tracked_space, tracking_key, Cache, CacheError, Result,
};

/// Keys deleted per DEL command during a SCAN sweep.
const SCAN_DELETE_BATCH: usize = 500;

fn map_redis_error(err: redis::RedisError) -> CacheError {
    if err.is_connection_refusal() || err.is_timeout() || err.is_connection_dropped() {
        CacheError::ConnectionFailed(err.to_string())
    } else {
        CacheError::OperationFailed(err.to_string())
    }
}

/// Escapes Redis glob metacharacters so `prefix` matches literally.
fn glob_escape(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Redis cache backend using a connection manager for pooling.
pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
}

impl RedisCache {
    /// Creates a new Redis cache connection.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the connection cannot be established.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { conn })
    }

    /// Sweeps keys outside the tracked spaces with `SCAN MATCH`.
    async fn delete_scanned(&self, prefix: &str) -> Result<usize> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", glob_escape(prefix));

        let mut keys: Vec<String> = Vec::new();
        {
            let mut iter: redis::AsyncIter<String> =
                conn.scan_match(&pattern).await.map_err(map_redis_error)?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }

        for batch in keys.chunks(SCAN_DELETE_BATCH) {
            conn.del::<_, ()>(batch).await.map_err(map_redis_error)?;
        }

        // A short prefix such as "group" can cover tracked spaces too
        for key in &keys {
            if let Some(space) = tracked_space(key) {
                conn.srem::<_, _, ()>(tracking_key(space), key)
                    .await
                    .map_err(map_redis_error)?;
            }
        }

        Ok(keys.len())
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let result: Option<Vec<u8>> = conn.get(key).await.map_err(map_redis_error)?;

        if result.is_none() {
            if let Some(space) = tracked_space(key) {
                // Expired entries linger in the tracking set until pruned here
                if let Err(e) = conn.srem::<_, _, ()>(tracking_key(space), key).await {
                    tracing::warn!(key, error = %e, "Failed to prune tracking set");
                }
            }
        }

        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();

        let mut pipe = redis::pipe();
        pipe.atomic();

        if let Some(space) = tracked_space(key) {
            pipe.sadd(tracking_key(space), key).ignore();
        }

        match ttl {
            Some(duration) => {
                let seconds = duration.as_secs().max(1);
                pipe.set_ex(key, value, seconds).ignore();
            }
            None => {
                pipe.set(key, value).ignore();
            }
        }

        let () = pipe.query_async(&mut conn).await.map_err(map_redis_error)?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();

        conn.del::<_, ()>(key).await.map_err(map_redis_error)?;

        if let Some(space) = tracked_space(key) {
            conn.srem::<_, _, ()>(tracking_key(space), key)
                .await
                .map_err(map_redis_error)?;
        }

        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<()> {
        let Some(space) = tracked_space(prefix) else {
            let deleted = self.delete_scanned(prefix).await?;
            tracing::trace!(prefix, deleted, "Swept untracked cache prefix");
            return Ok(());
        };

        let mut conn = self.conn.clone();
        let tracking = tracking_key(space);

        let tracked_keys: Vec<String> = conn
            .smembers(&tracking)
            .await
            .map_err(map_redis_error)?;

        let keys_to_delete: Vec<&String> = tracked_keys
            .iter()
            .filter(|k| prefix_matches(prefix, k))
            .collect();

        if !keys_to_delete.is_empty() {
            conn.del::<_, ()>(&keys_to_delete)
                .await
                .map_err(map_redis_error)?;

            conn.srem::<_, _, ()>(&tracking, &keys_to_delete)
                .await
                .map_err(map_redis_error)?;
        }

        tracing::trace!(prefix, deleted = keys_to_delete.len(), "Swept cache prefix");

        Ok(())
    }
}
