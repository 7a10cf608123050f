//! SQLite-backed [`GraphAdapter`](crate::adapter::GraphAdapter) implementation.
//!
//! Vertices, edges and properties live in three tables; native iteration order is
//! ascending row id, which is insertion order for a single connection. Adjacency
//! lookups are served from a per-vertex cache that every edge mutation and every
//! rollback invalidates.

mod helpers;
mod impl_;

pub use impl_::SqliteAdapter;
