use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub i64);

impl VertexId {
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl EdgeId {
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl From<i64> for VertexId {
    fn from(value: i64) -> Self {
        VertexId(value)
    }
}

impl From<i64> for EdgeId {
    fn from(value: i64) -> Self {
        EdgeId(value)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of a graph element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Vertex,
    Edge,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Vertex => f.write_str("vertex"),
            ElementKind::Edge => f.write_str("edge"),
        }
    }
}

/// Identity of a single graph element. Vertices and edges live in separate id spaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Vertex(VertexId),
    Edge(EdgeId),
}

impl Element {
    pub fn kind(self) -> ElementKind {
        match self {
            Element::Vertex(_) => ElementKind::Vertex,
            Element::Edge(_) => ElementKind::Edge,
        }
    }

    pub fn as_vertex(self) -> Option<VertexId> {
        match self {
            Element::Vertex(id) => Some(id),
            Element::Edge(_) => None,
        }
    }

    pub fn as_edge(self) -> Option<EdgeId> {
        match self {
            Element::Edge(id) => Some(id),
            Element::Vertex(_) => None,
        }
    }

    pub fn raw_id(self) -> i64 {
        match self {
            Element::Vertex(id) => id.0,
            Element::Edge(id) => id.0,
        }
    }
}

impl From<VertexId> for Element {
    fn from(value: VertexId) -> Self {
        Element::Vertex(value)
    }
}

impl From<EdgeId> for Element {
    fn from(value: EdgeId) -> Self {
        Element::Edge(value)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.raw_id())
    }
}

/// Direction of an adjacency lookup relative to the source vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Out,
    In,
    Both,
}

/// An edge as reported by an adapter: label plus ordered (tail, head) pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: EdgeId,
    pub label: String,
    pub tail: VertexId,
    pub head: VertexId,
}

impl EdgeRecord {
    /// The endpoint opposite to `vertex`. A self-loop returns `vertex` itself.
    pub fn opposite(&self, vertex: VertexId) -> VertexId {
        if self.tail == vertex { self.head } else { self.tail }
    }
}
