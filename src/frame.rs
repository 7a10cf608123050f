//! Typed handles over single graph elements.
//!
//! A frame is an element id plus a borrow of the owning [`FramedGraph`]. Frame
//! types are thin newtypes over [`FramedVertex`] or [`FramedEdge`] (see
//! [`vertex_frame!`](crate::vertex_frame) and [`edge_frame!`](crate::edge_frame)),
//! so re-typing never changes which element a frame points at.

mod edge;
mod macros;
mod vertex;

pub use edge::{EdgeType, FramedEdge};
pub use vertex::{FramedVertex, VertexType};

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    errors::FrameGraphError,
    graph::FramedGraph,
    resolver::{CastMode, TypeDescriptor},
    types::Element,
};

/// Property access shared by every frame.
pub trait ElementFrame<'g> {
    fn graph(&self) -> &'g FramedGraph;
    fn element(&self) -> Element;

    fn get_property(&self, key: &str) -> Result<Option<Value>, FrameGraphError> {
        self.graph().adapter().get_property(self.element(), key)
    }

    /// Reads a property and deserializes it into `T`.
    fn property<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, FrameGraphError> {
        match self.get_property(key)? {
            None => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                FrameGraphError::invalid_input(format!("property {key}: {e}"))
            }),
        }
    }

    /// Writes a property. Setting `Value::Null` removes the key.
    fn set_property<V: Into<Value>>(&self, key: &str, value: V) -> Result<(), FrameGraphError> {
        self.graph()
            .adapter()
            .set_property(self.element(), key, value.into())
    }

    fn remove_property(&self, key: &str) -> Result<Option<Value>, FrameGraphError> {
        self.graph().adapter().remove_property(self.element(), key)
    }

    fn properties(&self) -> Result<BTreeMap<String, Value>, FrameGraphError> {
        self.graph().adapter().properties(self.element())
    }

    /// Descriptor named by the stored discriminator, if any.
    fn resolved_type(&self) -> Result<Option<&'static TypeDescriptor>, FrameGraphError> {
        self.graph().resolve(self.element())
    }

    /// False once the backing element has been removed.
    fn is_live(&self) -> Result<bool, FrameGraphError> {
        self.graph().adapter().contains(self.element())
    }
}

pub(crate) fn cast_vertex<'g, T: VertexType<'g>>(
    graph: &'g FramedGraph,
    element: Element,
    mode: CastMode,
) -> Result<T, FrameGraphError> {
    let descriptor = T::descriptor();
    let id = element
        .as_vertex()
        .ok_or_else(|| FrameGraphError::type_mismatch(descriptor.name, element.to_string()))?;
    if mode == CastMode::Checked {
        graph
            .resolver()
            .check(graph.adapter(), element, descriptor)?;
    }
    Ok(T::from_vertex(FramedVertex::new(graph, id)))
}

pub(crate) fn cast_edge<'g, T: EdgeType<'g>>(
    graph: &'g FramedGraph,
    element: Element,
    mode: CastMode,
) -> Result<T, FrameGraphError> {
    let descriptor = T::descriptor();
    let id = element
        .as_edge()
        .ok_or_else(|| FrameGraphError::type_mismatch(descriptor.name, element.to_string()))?;
    if mode == CastMode::Checked {
        graph
            .resolver()
            .check(graph.adapter(), element, descriptor)?;
    }
    Ok(T::from_edge(FramedEdge::new(graph, id)))
}

/// `{"id", "elementClass", ...properties}`; the two fixed keys win over
/// properties of the same name.
pub(crate) fn element_json(
    element: Element,
    properties: BTreeMap<String, Value>,
) -> Map<String, Value> {
    let mut json: Map<String, Value> = properties.into_iter().collect();
    json.insert("id".to_string(), Value::from(element.raw_id()));
    json.insert(
        "elementClass".to_string(),
        Value::String(element.kind().to_string()),
    );
    json
}
