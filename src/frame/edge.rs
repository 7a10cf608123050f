use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde_json::Value;
use tracing::debug;

use crate::{
    errors::FrameGraphError,
    frame::{ElementFrame, FramedVertex, cast_edge, element_json},
    graph::FramedGraph,
    resolver::{CastMode, TEDGE, TypeDescriptor},
    traversal::{EdgeTraversal, Pipeline, Source, VertexTraversal},
    types::{EdgeId, EdgeRecord, Element},
};

/// Capability set of an edge frame type.
pub trait EdgeType<'g>: Sized {
    fn descriptor() -> &'static TypeDescriptor;
    fn from_edge(edge: FramedEdge<'g>) -> Self;
    fn as_edge(&self) -> &FramedEdge<'g>;
}

/// Untyped edge frame. Every edge frame type derefs to one.
#[derive(Clone, Copy)]
pub struct FramedEdge<'g> {
    graph: &'g FramedGraph,
    id: EdgeId,
}

impl<'g> FramedEdge<'g> {
    pub(crate) fn new(graph: &'g FramedGraph, id: EdgeId) -> Self {
        Self { graph, id }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn record(&self) -> Result<EdgeRecord, FrameGraphError> {
        self.graph.adapter().edge(self.id)
    }

    pub fn label(&self) -> Result<String, FrameGraphError> {
        Ok(self.record()?.label)
    }

    /// Vertex the edge starts at.
    pub fn tail(&self) -> Result<FramedVertex<'g>, FrameGraphError> {
        Ok(FramedVertex::new(self.graph, self.record()?.tail))
    }

    /// Vertex the edge points at.
    pub fn head(&self) -> Result<FramedVertex<'g>, FrameGraphError> {
        Ok(FramedVertex::new(self.graph, self.record()?.head))
    }

    pub fn reframe<T: EdgeType<'g>>(&self) -> Result<T, FrameGraphError> {
        self.reframe_as(CastMode::Checked)
    }

    pub fn reframe_explicit<T: EdgeType<'g>>(&self) -> T {
        T::from_edge(*self)
    }

    pub fn reframe_as<T: EdgeType<'g>>(&self, mode: CastMode) -> Result<T, FrameGraphError> {
        cast_edge(self.graph, Element::Edge(self.id), mode)
    }

    pub fn to_json(&self) -> Result<Value, FrameGraphError> {
        let record = self.record()?;
        let mut json = element_json(self.element(), self.properties()?);
        json.insert("label".to_string(), Value::String(record.label));
        json.insert("tail".to_string(), Value::from(record.tail.0));
        json.insert("head".to_string(), Value::from(record.head.0));
        Ok(Value::Object(json))
    }

    pub fn traversal(&self) -> EdgeTraversal<'g> {
        EdgeTraversal::from_pipeline(Pipeline::new(self.graph, Source::Edge(self.id)))
    }

    pub fn tail_v(&self) -> VertexTraversal<'g> {
        self.traversal().tail()
    }

    pub fn head_v(&self) -> VertexTraversal<'g> {
        self.traversal().head()
    }

    pub fn remove(self) -> Result<(), FrameGraphError> {
        self.graph
            .unit_of_work(|| self.graph.adapter().remove_edge(self.id))?;
        debug!(edge = self.id.0, "edge removed");
        Ok(())
    }
}

impl<'g> ElementFrame<'g> for FramedEdge<'g> {
    fn graph(&self) -> &'g FramedGraph {
        self.graph
    }

    fn element(&self) -> Element {
        Element::Edge(self.id)
    }
}

impl<'g> EdgeType<'g> for FramedEdge<'g> {
    fn descriptor() -> &'static TypeDescriptor {
        &TEDGE
    }

    fn from_edge(edge: FramedEdge<'g>) -> Self {
        edge
    }

    fn as_edge(&self) -> &FramedEdge<'g> {
        self
    }
}

impl fmt::Debug for FramedEdge<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FramedEdge").field(&self.id.0).finish()
    }
}

impl PartialEq for FramedEdge<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FramedEdge<'_> {}

impl Hash for FramedEdge<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl From<FramedEdge<'_>> for Element {
    fn from(edge: FramedEdge<'_>) -> Self {
        Element::Edge(edge.id)
    }
}

impl From<&FramedEdge<'_>> for Element {
    fn from(edge: &FramedEdge<'_>) -> Self {
        Element::Edge(edge.id)
    }
}
