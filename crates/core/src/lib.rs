//! Functional core for orgtree.
//!
//! Pure domain types, cache key construction, the cache-aside engine and the
//! repository contracts consumed by the hierarchy service. Backends live in
//! the `orgtree` crate.

pub mod cache;
pub mod hierarchy;
pub mod serde;
pub mod storage;
