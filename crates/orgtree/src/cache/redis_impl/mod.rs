//! Redis cache backend implementation.
//!
//! Provides a shared cache for multi-instance deployments, with connection
//! pooling, TTL and tracked prefix deletion.

mod cache;

pub use cache::RedisCache;
