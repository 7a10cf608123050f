//! Graph adapter trait bridging the framing layer with a concrete property-graph store.
//!
//! The engine never talks to storage directly; every vertex, edge, property and
//! transaction boundary goes through [`GraphAdapter`]. Two adapters ship with the
//! crate: [`SqliteAdapter`] (rusqlite) and [`MemoryAdapter`] (in-process maps).

#[cfg(feature = "sqlite-adapter")]
mod sqlite;

pub mod memory;

#[cfg(feature = "sqlite-adapter")]
pub use sqlite::SqliteAdapter;

pub use memory::MemoryAdapter;

use std::collections::BTreeMap;

use serde_json::Value;

use crate::{
    errors::FrameGraphError,
    types::{Direction, EdgeId, EdgeRecord, Element, VertexId},
};

/// Storage surface consumed by the framing layer.
///
/// Adjacency lookups report edges in the adapter's native iteration order. For
/// [`Direction::Both`] that is all outgoing edges followed by all incoming edges,
/// so a self-loop shows up twice. An empty `labels` slice selects every label.
pub trait GraphAdapter {
    fn create_vertex(&self) -> Result<VertexId, FrameGraphError>;
    fn create_edge(
        &self,
        label: &str,
        tail: VertexId,
        head: VertexId,
    ) -> Result<EdgeId, FrameGraphError>;
    fn remove_vertex(&self, id: VertexId) -> Result<(), FrameGraphError>;
    fn remove_edge(&self, id: EdgeId) -> Result<(), FrameGraphError>;
    fn get_property(&self, element: Element, key: &str) -> Result<Option<Value>, FrameGraphError>;
    fn set_property(&self, element: Element, key: &str, value: Value)
    -> Result<(), FrameGraphError>;
    fn remove_property(
        &self,
        element: Element,
        key: &str,
    ) -> Result<Option<Value>, FrameGraphError>;
    fn properties(&self, element: Element) -> Result<BTreeMap<String, Value>, FrameGraphError>;
    fn edge(&self, id: EdgeId) -> Result<EdgeRecord, FrameGraphError>;
    fn contains(&self, element: Element) -> Result<bool, FrameGraphError>;
    fn adjacent_edges(
        &self,
        vertex: VertexId,
        direction: Direction,
        labels: &[&str],
    ) -> Result<Vec<EdgeRecord>, FrameGraphError>;
    fn vertex_ids(&self) -> Result<Vec<VertexId>, FrameGraphError>;
    fn edge_ids(&self) -> Result<Vec<EdgeId>, FrameGraphError>;
    fn begin(&self) -> Result<(), FrameGraphError>;
    fn commit(&self) -> Result<(), FrameGraphError>;
    fn rollback(&self) -> Result<(), FrameGraphError>;

    /// Opens a named rollback point inside the active transaction.
    fn savepoint(&self, name: &str) -> Result<(), FrameGraphError>;
    /// Drops the savepoint. Its writes stay part of the enclosing transaction.
    fn release_savepoint(&self, name: &str) -> Result<(), FrameGraphError>;
    /// Undoes every write made since the savepoint was opened, then drops it.
    fn rollback_to_savepoint(&self, name: &str) -> Result<(), FrameGraphError>;

    fn remove_element(&self, element: Element) -> Result<(), FrameGraphError> {
        match element {
            Element::Vertex(id) => self.remove_vertex(id),
            Element::Edge(id) => self.remove_edge(id),
        }
    }
}

impl<A> GraphAdapter for &A
where
    A: GraphAdapter + ?Sized,
{
    fn create_vertex(&self) -> Result<VertexId, FrameGraphError> {
        (*self).create_vertex()
    }

    fn create_edge(
        &self,
        label: &str,
        tail: VertexId,
        head: VertexId,
    ) -> Result<EdgeId, FrameGraphError> {
        (*self).create_edge(label, tail, head)
    }

    fn remove_vertex(&self, id: VertexId) -> Result<(), FrameGraphError> {
        (*self).remove_vertex(id)
    }

    fn remove_edge(&self, id: EdgeId) -> Result<(), FrameGraphError> {
        (*self).remove_edge(id)
    }

    fn get_property(&self, element: Element, key: &str) -> Result<Option<Value>, FrameGraphError> {
        (*self).get_property(element, key)
    }

    fn set_property(
        &self,
        element: Element,
        key: &str,
        value: Value,
    ) -> Result<(), FrameGraphError> {
        (*self).set_property(element, key, value)
    }

    fn remove_property(
        &self,
        element: Element,
        key: &str,
    ) -> Result<Option<Value>, FrameGraphError> {
        (*self).remove_property(element, key)
    }

    fn properties(&self, element: Element) -> Result<BTreeMap<String, Value>, FrameGraphError> {
        (*self).properties(element)
    }

    fn edge(&self, id: EdgeId) -> Result<EdgeRecord, FrameGraphError> {
        (*self).edge(id)
    }

    fn contains(&self, element: Element) -> Result<bool, FrameGraphError> {
        (*self).contains(element)
    }

    fn adjacent_edges(
        &self,
        vertex: VertexId,
        direction: Direction,
        labels: &[&str],
    ) -> Result<Vec<EdgeRecord>, FrameGraphError> {
        (*self).adjacent_edges(vertex, direction, labels)
    }

    fn vertex_ids(&self) -> Result<Vec<VertexId>, FrameGraphError> {
        (*self).vertex_ids()
    }

    fn edge_ids(&self) -> Result<Vec<EdgeId>, FrameGraphError> {
        (*self).edge_ids()
    }

    fn begin(&self) -> Result<(), FrameGraphError> {
        (*self).begin()
    }

    fn commit(&self) -> Result<(), FrameGraphError> {
        (*self).commit()
    }

    fn rollback(&self) -> Result<(), FrameGraphError> {
        (*self).rollback()
    }

    fn savepoint(&self, name: &str) -> Result<(), FrameGraphError> {
        (*self).savepoint(name)
    }

    fn release_savepoint(&self, name: &str) -> Result<(), FrameGraphError> {
        (*self).release_savepoint(name)
    }

    fn rollback_to_savepoint(&self, name: &str) -> Result<(), FrameGraphError> {
        (*self).rollback_to_savepoint(name)
    }
}

pub(crate) fn validate_label(label: &str) -> Result<(), FrameGraphError> {
    if label.trim().is_empty() {
        return Err(FrameGraphError::invalid_input("edge label must be set"));
    }
    Ok(())
}

/// Savepoint names end up in SQL, so only identifiers are accepted.
pub(crate) fn validate_savepoint(name: &str) -> Result<(), FrameGraphError> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(FrameGraphError::invalid_input(format!(
            "invalid savepoint name {name:?}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_key(key: &str) -> Result<(), FrameGraphError> {
    if key.trim().is_empty() {
        return Err(FrameGraphError::invalid_input("property key must be set"));
    }
    Ok(())
}

pub(crate) fn validate_value(key: &str, value: &Value) -> Result<(), FrameGraphError> {
    match value {
        Value::Array(_) | Value::Object(_) => Err(FrameGraphError::invalid_input(format!(
            "property {key} must hold a scalar value"
        ))),
        _ => Ok(()),
    }
}

/// Keeps the edges whose label is selected. An empty selection keeps everything.
pub(crate) fn label_selected(labels: &[&str], label: &str) -> bool {
    labels.is_empty() || labels.contains(&label)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_label_selection_treats_empty_as_all() {
        assert!(label_selected(&[], "knows"));
        assert!(label_selected(&["knows", "likes"], "likes"));
        assert!(!label_selected(&["knows"], "likes"));
    }

    #[test]
    fn test_value_validation_rejects_nested_values() {
        assert!(validate_value("name", &json!("Bryn")).is_ok());
        assert!(validate_value("age", &json!(42)).is_ok());
        assert!(validate_value("tags", &json!(["a"])).is_err());
        assert!(validate_value("meta", &json!({"a": 1})).is_err());
    }

    #[test]
    fn test_key_and_label_validation() {
        assert!(validate_key("").is_err());
        assert!(validate_key("  ").is_err());
        assert!(validate_label("").is_err());
        assert!(validate_label("knows").is_ok());
    }

    #[test]
    fn test_savepoint_names_are_identifiers() {
        assert!(validate_savepoint("unit_1").is_ok());
        assert!(validate_savepoint("_inner").is_ok());
        assert!(validate_savepoint("").is_err());
        assert!(validate_savepoint("1unit").is_err());
        assert!(validate_savepoint("unit; DROP TABLE graph_edges").is_err());
    }
}
