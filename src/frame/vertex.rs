use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde_json::Value;
use tracing::debug;

use crate::{
    errors::FrameGraphError,
    frame::{EdgeType, ElementFrame, FramedEdge, cast_vertex, element_json},
    graph::FramedGraph,
    resolver::{CastMode, TVERTEX, TypeDescriptor},
    traversal::{EdgeTraversal, Pipeline, Source, VertexTraversal},
    types::{Direction, EdgeRecord, Element, VertexId},
};

/// Capability set of a vertex frame type.
pub trait VertexType<'g>: Sized {
    fn descriptor() -> &'static TypeDescriptor;
    fn from_vertex(vertex: FramedVertex<'g>) -> Self;
    fn as_vertex(&self) -> &FramedVertex<'g>;
}

/// Untyped vertex frame. Every vertex frame type derefs to one.
#[derive(Clone, Copy)]
pub struct FramedVertex<'g> {
    graph: &'g FramedGraph,
    id: VertexId,
}

impl<'g> FramedVertex<'g> {
    pub(crate) fn new(graph: &'g FramedGraph, id: VertexId) -> Self {
        Self { graph, id }
    }

    pub fn id(&self) -> VertexId {
        self.id
    }

    /// Re-resolves this vertex as `T`, validating the stored discriminator.
    pub fn reframe<T: VertexType<'g>>(&self) -> Result<T, FrameGraphError> {
        self.reframe_as(CastMode::Checked)
    }

    /// Wraps this vertex as `T` without consulting the resolver.
    pub fn reframe_explicit<T: VertexType<'g>>(&self) -> T {
        T::from_vertex(*self)
    }

    pub fn reframe_as<T: VertexType<'g>>(&self, mode: CastMode) -> Result<T, FrameGraphError> {
        cast_vertex(self.graph, Element::Vertex(self.id), mode)
    }

    pub fn to_json(&self) -> Result<Value, FrameGraphError> {
        let properties = self.properties()?;
        Ok(Value::Object(element_json(self.element(), properties)))
    }

    /// Traversal rooted at this vertex.
    pub fn traversal(&self) -> VertexTraversal<'g> {
        VertexTraversal::from_pipeline(Pipeline::new(self.graph, Source::Vertex(self.id)))
    }

    pub fn out(&self, labels: &[&str]) -> VertexTraversal<'g> {
        self.traversal().out(labels)
    }

    pub fn out_bounded(&self, branch_factor: usize, labels: &[&str]) -> VertexTraversal<'g> {
        self.traversal().out_bounded(branch_factor, labels)
    }

    pub fn in_(&self, labels: &[&str]) -> VertexTraversal<'g> {
        self.traversal().in_(labels)
    }

    pub fn in_bounded(&self, branch_factor: usize, labels: &[&str]) -> VertexTraversal<'g> {
        self.traversal().in_bounded(branch_factor, labels)
    }

    pub fn both(&self, labels: &[&str]) -> VertexTraversal<'g> {
        self.traversal().both(labels)
    }

    pub fn both_bounded(&self, branch_factor: usize, labels: &[&str]) -> VertexTraversal<'g> {
        self.traversal().both_bounded(branch_factor, labels)
    }

    pub fn out_e(&self, labels: &[&str]) -> EdgeTraversal<'g> {
        self.traversal().out_e(labels)
    }

    pub fn out_e_bounded(&self, branch_factor: usize, labels: &[&str]) -> EdgeTraversal<'g> {
        self.traversal().out_e_bounded(branch_factor, labels)
    }

    pub fn in_e(&self, labels: &[&str]) -> EdgeTraversal<'g> {
        self.traversal().in_e(labels)
    }

    pub fn in_e_bounded(&self, branch_factor: usize, labels: &[&str]) -> EdgeTraversal<'g> {
        self.traversal().in_e_bounded(branch_factor, labels)
    }

    pub fn both_e(&self, labels: &[&str]) -> EdgeTraversal<'g> {
        self.traversal().both_e(labels)
    }

    pub fn both_e_bounded(&self, branch_factor: usize, labels: &[&str]) -> EdgeTraversal<'g> {
        self.traversal().both_e_bounded(branch_factor, labels)
    }

    /// Creates an edge `self -> head` typed as `T`.
    pub fn add_framed_edge<T: EdgeType<'g>>(
        &self,
        label: &str,
        head: &FramedVertex<'g>,
    ) -> Result<T, FrameGraphError> {
        self.graph.add_framed_edge(label, self, head)
    }

    pub fn add_framed_edge_explicit<T: EdgeType<'g>>(
        &self,
        label: &str,
        head: &FramedVertex<'g>,
    ) -> Result<T, FrameGraphError> {
        self.graph.add_framed_edge_explicit(label, self, head)
    }

    pub fn add_edge(
        &self,
        label: &str,
        head: &FramedVertex<'g>,
    ) -> Result<FramedEdge<'g>, FrameGraphError> {
        self.graph.add_edge(label, self, head)
    }

    /// Incident edges in adapter order, as raw records.
    pub(crate) fn adjacent(
        &self,
        direction: Direction,
        labels: &[&str],
    ) -> Result<Vec<EdgeRecord>, FrameGraphError> {
        self.graph.adapter().adjacent_edges(self.id, direction, labels)
    }

    /// Removes the vertex together with its incident edges. The frame must not be
    /// used afterwards.
    pub fn remove(self) -> Result<(), FrameGraphError> {
        self.graph
            .unit_of_work(|| self.graph.adapter().remove_vertex(self.id))?;
        debug!(vertex = self.id.0, "vertex removed");
        Ok(())
    }
}

impl<'g> ElementFrame<'g> for FramedVertex<'g> {
    fn graph(&self) -> &'g FramedGraph {
        self.graph
    }

    fn element(&self) -> Element {
        Element::Vertex(self.id)
    }
}

impl<'g> VertexType<'g> for FramedVertex<'g> {
    fn descriptor() -> &'static TypeDescriptor {
        &TVERTEX
    }

    fn from_vertex(vertex: FramedVertex<'g>) -> Self {
        vertex
    }

    fn as_vertex(&self) -> &FramedVertex<'g> {
        self
    }
}

impl fmt::Debug for FramedVertex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FramedVertex").field(&self.id.0).finish()
    }
}

impl PartialEq for FramedVertex<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FramedVertex<'_> {}

impl Hash for FramedVertex<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl From<FramedVertex<'_>> for Element {
    fn from(vertex: FramedVertex<'_>) -> Self {
        Element::Vertex(vertex.id)
    }
}

impl From<&FramedVertex<'_>> for Element {
    fn from(vertex: &FramedVertex<'_>) -> Self {
        Element::Vertex(vertex.id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::resolver::TypeRegistry;

    #[test]
    fn test_frames_compare_by_element() {
        let graph = FramedGraph::in_memory(TypeRegistry::new());
        let a: FramedVertex = graph.add_vertex().unwrap();
        let b: FramedVertex = graph.add_vertex().unwrap();
        assert_eq!(a, graph.vertex(a.id()).unwrap());
        assert_ne!(a, b);
        assert_eq!(format!("{a:?}"), format!("FramedVertex({})", a.id().0));
    }

    #[test]
    fn test_to_json_includes_id_and_class() {
        let graph = FramedGraph::in_memory(TypeRegistry::new());
        let v: FramedVertex = graph.add_vertex().unwrap();
        v.set_property("name", "Julia").unwrap();
        assert_eq!(
            v.to_json().unwrap(),
            json!({"id": v.id().0, "elementClass": "vertex", "name": "Julia"})
        );
    }

    #[test]
    fn test_remove_marks_frame_dead() {
        let graph = FramedGraph::in_memory(TypeRegistry::new());
        let v: FramedVertex = graph.add_vertex().unwrap();
        let copy = v;
        v.remove().unwrap();
        assert!(!copy.is_live().unwrap());
        assert!(matches!(
            copy.get_property("name"),
            Err(FrameGraphError::StaleFrame(_))
        ));
    }
}
