//! Cached hierarchy service: traversals, invalidation and write operations.

mod ancestors;
mod invalidation;
mod service;
mod subtree;
#[cfg(test)]
pub(crate) mod testing;

pub use service::HierarchyService;
