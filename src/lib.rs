//! Typed object-graph mapping over property graphs.
//!
//! `framegraph` projects vertices and edges onto typed frames, composes lazy
//! traversals over them and offers link operators for compound edge
//! mutations. Storage is reached only through the [`GraphAdapter`] trait; a
//! SQLite adapter and an in-memory adapter ship with the crate.
//!
//! ```rust
//! use framegraph::{FramedGraph, TypeDescriptor, TypeRegistry, vertex_frame};
//!
//! static PERSON: TypeDescriptor = TypeDescriptor::vertex("Person").with_labels(&["knows"]);
//!
//! vertex_frame! {
//!     pub struct Person => PERSON;
//! }
//!
//! let graph = FramedGraph::in_memory(TypeRegistry::new().with(&PERSON));
//! let julia: Person = graph.add_vertex()?;
//! let bryn: Person = graph.add_vertex()?;
//!
//! julia.link_out(&bryn, &["knows"])?;
//! assert_eq!(julia.out(&["knows"]).next::<Person>()?, bryn);
//!
//! julia.set_link_out(&julia, &["knows"])?;
//! assert_eq!(julia.out_e(&["knows"]).count()?, 1);
//! # Ok::<(), framegraph::FrameGraphError>(())
//! ```
//!
//! Run Criterion benchmarks with `cargo bench` to inspect reports under `target/criterion`.

pub mod adapter;
pub mod cache;
pub mod config;
pub mod errors;
pub mod frame;
pub mod graph;
mod link;
pub mod resolver;
pub mod schema;
pub mod traversal;
pub mod types;
mod unit_of_work;

#[cfg(feature = "sqlite-adapter")]
pub use crate::adapter::SqliteAdapter;
pub use crate::adapter::{GraphAdapter, MemoryAdapter};
pub use crate::config::{AdapterKind, FrameGraphConfig, SqliteConfig, open_framed_graph};
pub use crate::errors::FrameGraphError;
pub use crate::frame::{EdgeType, ElementFrame, FramedEdge, FramedVertex, VertexType};
pub use crate::graph::FramedGraph;
pub use crate::resolver::{
    CastMode, DEFAULT_TYPE_KEY, PolymorphicTypeResolver, TEDGE, TVERTEX, TypeDescriptor,
    TypeRegistry, TypeResolver,
};
pub use crate::traversal::{EdgeTraversal, VertexTraversal};
pub use crate::types::{Direction, EdgeId, EdgeRecord, Element, ElementKind, VertexId};
