//! Row mapping and property encoding shared by the SQLite adapter.

use serde_json::Value;

use crate::{
    errors::FrameGraphError,
    types::{EdgeId, EdgeRecord, Element, VertexId},
};

pub(super) const VERTEX_OWNER: i64 = 0;
pub(super) const EDGE_OWNER: i64 = 1;

pub(super) const OUTGOING_SQL: &str =
    "SELECT id, tail_id, head_id, label FROM graph_edges WHERE tail_id=?1 ORDER BY id";
pub(super) const INCOMING_SQL: &str =
    "SELECT id, tail_id, head_id, label FROM graph_edges WHERE head_id=?1 ORDER BY id";

/// Splits an element into the `(owner_kind, owner_id)` pair used by `graph_properties`.
pub(super) fn owner(element: Element) -> (i64, i64) {
    match element {
        Element::Vertex(id) => (VERTEX_OWNER, id.0),
        Element::Edge(id) => (EDGE_OWNER, id.0),
    }
}

pub(super) fn row_to_edge(row: &rusqlite::Row<'_>) -> Result<EdgeRecord, rusqlite::Error> {
    Ok(EdgeRecord {
        id: EdgeId(row.get(0)?),
        tail: VertexId(row.get(1)?),
        head: VertexId(row.get(2)?),
        label: row.get(3)?,
    })
}

pub(super) fn encode_value(value: &Value) -> Result<String, FrameGraphError> {
    serde_json::to_string(value).map_err(|e| FrameGraphError::invalid_input(e.to_string()))
}

pub(super) fn decode_value(raw: &str) -> Result<Value, FrameGraphError> {
    serde_json::from_str(raw).map_err(|e| FrameGraphError::query(e.to_string()))
}

pub(super) fn query_err(err: rusqlite::Error) -> FrameGraphError {
    FrameGraphError::query(err.to_string())
}

pub(super) fn tx_err(err: rusqlite::Error) -> FrameGraphError {
    FrameGraphError::transaction(err.to_string())
}
