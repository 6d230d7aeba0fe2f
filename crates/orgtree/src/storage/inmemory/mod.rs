//! In-memory storage backend.
//!
//! Stores all rows in ordered maps behind an `Arc<RwLock<_>>`. Useful for
//! tests and local development where persistence is not required.

mod repository;

pub use repository::InMemoryRepository;
