//! Frame graph context: owns the adapter and the resolver, creates frames and
//! hands out traversal roots.

use crate::{
    adapter::{GraphAdapter, MemoryAdapter},
    errors::FrameGraphError,
    frame::{EdgeType, FramedEdge, FramedVertex, VertexType, cast_edge, cast_vertex},
    resolver::{CastMode, PolymorphicTypeResolver, TypeDescriptor, TypeRegistry, TypeResolver},
    traversal::{EdgeTraversal, Pipeline, Source, VertexTraversal},
    types::{EdgeId, Element, VertexId},
    unit_of_work::{UnitDepth, UnitOfWork},
};

#[cfg(feature = "sqlite-adapter")]
use crate::adapter::SqliteAdapter;

/// Typed view over a property graph.
///
/// Frames borrow the context, so every frame, traversal and link operation is
/// tied to the lifetime of the `FramedGraph` it came from.
///
/// The context is `Send` but not `Sync`: it can move to another thread, but only
/// one thread drives it at a time. Unit-of-work nesting is tracked per context, and
/// the SQLite connection is single-threaded. Open one context per thread for
/// concurrent work.
pub struct FramedGraph {
    adapter: Box<dyn GraphAdapter + Send>,
    resolver: Box<dyn TypeResolver + Send>,
    depth: UnitDepth,
}

impl FramedGraph {
    pub fn new<A>(adapter: A, registry: TypeRegistry) -> Self
    where
        A: GraphAdapter + Send + 'static,
    {
        Self::with_resolver(adapter, PolymorphicTypeResolver::new(registry))
    }

    pub fn with_resolver<A, R>(adapter: A, resolver: R) -> Self
    where
        A: GraphAdapter + Send + 'static,
        R: TypeResolver + Send + 'static,
    {
        Self {
            adapter: Box::new(adapter),
            resolver: Box::new(resolver),
            depth: UnitDepth::default(),
        }
    }

    pub fn in_memory(registry: TypeRegistry) -> Self {
        Self::new(MemoryAdapter::new(), registry)
    }

    #[cfg(feature = "sqlite-adapter")]
    pub fn sqlite_in_memory(registry: TypeRegistry) -> Result<Self, FrameGraphError> {
        Ok(Self::new(SqliteAdapter::open_in_memory()?, registry))
    }

    pub fn adapter(&self) -> &dyn GraphAdapter {
        self.adapter.as_ref()
    }

    pub fn resolver(&self) -> &dyn TypeResolver {
        self.resolver.as_ref()
    }

    /// Runs `work` as one unit of work: committed on `Ok`, rolled back on `Err`
    /// or panic. A call nested inside another unit joins it through a savepoint, so
    /// its failure only undoes its own writes.
    pub fn unit_of_work<R, F>(&self, work: F) -> Result<R, FrameGraphError>
    where
        F: FnOnce() -> Result<R, FrameGraphError>,
    {
        UnitOfWork::begin(self.adapter(), &self.depth)?.run(work)
    }

    pub fn in_unit_of_work(&self) -> bool {
        self.depth.get() > 0
    }

    pub fn add_vertex<'g, T: VertexType<'g>>(&'g self) -> Result<T, FrameGraphError> {
        self.add_vertex_as(CastMode::Checked)
    }

    /// Creates a vertex without writing a type discriminator.
    pub fn add_vertex_explicit<'g, T: VertexType<'g>>(&'g self) -> Result<T, FrameGraphError> {
        self.add_vertex_as(CastMode::Explicit)
    }

    pub(crate) fn add_vertex_as<'g, T: VertexType<'g>>(
        &'g self,
        mode: CastMode,
    ) -> Result<T, FrameGraphError> {
        let id = self.unit_of_work(|| {
            let id = self.adapter.create_vertex()?;
            if mode == CastMode::Checked {
                self.resolver
                    .stamp(self.adapter(), Element::Vertex(id), T::descriptor())?;
            }
            Ok(id)
        })?;
        tracing::debug!(vertex = id.0, frame_type = T::descriptor().name, "vertex added");
        Ok(T::from_vertex(FramedVertex::new(self, id)))
    }

    pub fn add_framed_edge<'g, T: EdgeType<'g>>(
        &'g self,
        label: &str,
        tail: &FramedVertex<'g>,
        head: &FramedVertex<'g>,
    ) -> Result<T, FrameGraphError> {
        self.add_framed_edge_as(label, tail, head, CastMode::Checked)
    }

    /// Creates an edge without writing a type discriminator.
    pub fn add_framed_edge_explicit<'g, T: EdgeType<'g>>(
        &'g self,
        label: &str,
        tail: &FramedVertex<'g>,
        head: &FramedVertex<'g>,
    ) -> Result<T, FrameGraphError> {
        self.add_framed_edge_as(label, tail, head, CastMode::Explicit)
    }

    pub fn add_edge<'g>(
        &'g self,
        label: &str,
        tail: &FramedVertex<'g>,
        head: &FramedVertex<'g>,
    ) -> Result<FramedEdge<'g>, FrameGraphError> {
        self.add_framed_edge_as(label, tail, head, CastMode::Explicit)
    }

    pub(crate) fn add_framed_edge_as<'g, T: EdgeType<'g>>(
        &'g self,
        label: &str,
        tail: &FramedVertex<'g>,
        head: &FramedVertex<'g>,
        mode: CastMode,
    ) -> Result<T, FrameGraphError> {
        let id = self.unit_of_work(|| {
            let id = self.adapter.create_edge(label, tail.id(), head.id())?;
            if mode == CastMode::Checked {
                self.resolver
                    .stamp(self.adapter(), Element::Edge(id), T::descriptor())?;
            }
            Ok(id)
        })?;
        tracing::debug!(
            edge = id.0,
            label,
            tail = tail.id().0,
            head = head.id().0,
            "edge added"
        );
        Ok(T::from_edge(FramedEdge::new(self, id)))
    }

    /// Frames an existing vertex. Fails with `StaleFrame` when the vertex is gone.
    pub fn vertex<'g>(&'g self, id: VertexId) -> Result<FramedVertex<'g>, FrameGraphError> {
        if !self.adapter.contains(Element::Vertex(id))? {
            return Err(FrameGraphError::stale(Element::Vertex(id).to_string()));
        }
        Ok(FramedVertex::new(self, id))
    }

    /// Frames an existing edge. Fails with `StaleFrame` when the edge is gone.
    pub fn edge<'g>(&'g self, id: EdgeId) -> Result<FramedEdge<'g>, FrameGraphError> {
        if !self.adapter.contains(Element::Edge(id))? {
            return Err(FrameGraphError::stale(Element::Edge(id).to_string()));
        }
        Ok(FramedEdge::new(self, id))
    }

    pub fn frame_vertex<'g, T: VertexType<'g>>(
        &'g self,
        id: VertexId,
        mode: CastMode,
    ) -> Result<T, FrameGraphError> {
        cast_vertex(self, Element::Vertex(id), mode)
    }

    pub fn frame_edge<'g, T: EdgeType<'g>>(
        &'g self,
        id: EdgeId,
        mode: CastMode,
    ) -> Result<T, FrameGraphError> {
        cast_edge(self, Element::Edge(id), mode)
    }

    /// Descriptor recorded for `element`, if any.
    pub fn resolve(
        &self,
        element: Element,
    ) -> Result<Option<&'static TypeDescriptor>, FrameGraphError> {
        self.resolver.resolve(self.adapter(), element)
    }

    pub fn vertices(&self) -> VertexTraversal<'_> {
        VertexTraversal::from_pipeline(Pipeline::new(self, Source::AllVertices))
    }

    pub fn edges(&self) -> EdgeTraversal<'_> {
        EdgeTraversal::from_pipeline(Pipeline::new(self, Source::AllEdges))
    }

    pub fn v<I>(&self, ids: I) -> VertexTraversal<'_>
    where
        I: IntoIterator<Item = VertexId>,
    {
        VertexTraversal::from_pipeline(Pipeline::new(
            self,
            Source::Vertices(ids.into_iter().collect()),
        ))
    }

    pub fn e<I>(&self, ids: I) -> EdgeTraversal<'_>
    where
        I: IntoIterator<Item = EdgeId>,
    {
        EdgeTraversal::from_pipeline(Pipeline::new(
            self,
            Source::Edges(ids.into_iter().collect()),
        ))
    }
}
