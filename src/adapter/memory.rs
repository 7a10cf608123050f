//! In-process [`GraphAdapter`] backed by ordered maps.
//!
//! Ids are allocated monotonically, so ascending id order is insertion order and
//! serves as the native iteration order. Transactions snapshot the whole state at
//! `begin` and restore it on `rollback`. Savepoints push further snapshots onto a
//! stack inside the transaction.

use std::collections::BTreeMap;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    adapter::{
        GraphAdapter, label_selected, validate_key, validate_label, validate_savepoint,
        validate_value,
    },
    errors::FrameGraphError,
    types::{Direction, EdgeId, EdgeRecord, Element, VertexId},
};

#[derive(Clone, Debug, Default)]
struct VertexSlot {
    properties: BTreeMap<String, Value>,
    outgoing: Vec<EdgeId>,
    incoming: Vec<EdgeId>,
}

#[derive(Clone, Debug)]
struct EdgeSlot {
    record: EdgeRecord,
    properties: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, Default)]
struct MemoryState {
    next_vertex: i64,
    next_edge: i64,
    vertices: BTreeMap<VertexId, VertexSlot>,
    edges: BTreeMap<EdgeId, EdgeSlot>,
}

impl MemoryState {
    fn properties_mut(
        &mut self,
        element: Element,
    ) -> Result<&mut BTreeMap<String, Value>, FrameGraphError> {
        match element {
            Element::Vertex(id) => self.vertices.get_mut(&id).map(|slot| &mut slot.properties),
            Element::Edge(id) => self.edges.get_mut(&id).map(|slot| &mut slot.properties),
        }
        .ok_or_else(|| FrameGraphError::stale(element.to_string()))
    }

    fn properties(&self, element: Element) -> Result<&BTreeMap<String, Value>, FrameGraphError> {
        match element {
            Element::Vertex(id) => self.vertices.get(&id).map(|slot| &slot.properties),
            Element::Edge(id) => self.edges.get(&id).map(|slot| &slot.properties),
        }
        .ok_or_else(|| FrameGraphError::stale(element.to_string()))
    }

    fn detach_edge(&mut self, id: EdgeId) -> Option<EdgeSlot> {
        let slot = self.edges.remove(&id)?;
        if let Some(tail) = self.vertices.get_mut(&slot.record.tail) {
            tail.outgoing.retain(|edge| *edge != id);
        }
        if let Some(head) = self.vertices.get_mut(&slot.record.head) {
            head.incoming.retain(|edge| *edge != id);
        }
        Some(slot)
    }

    fn collect(&self, ids: &[EdgeId], labels: &[&str], into: &mut Vec<EdgeRecord>) {
        for id in ids {
            if let Some(slot) = self.edges.get(id) {
                if label_selected(labels, &slot.record.label) {
                    into.push(slot.record.clone());
                }
            }
        }
    }
}

/// Property graph held entirely in memory.
#[derive(Default)]
pub struct MemoryAdapter {
    state: RwLock<MemoryState>,
    undo: Mutex<Option<MemoryState>>,
    savepoints: Mutex<Vec<(String, MemoryState)>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.state.read().vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.state.read().edges.len()
    }

    pub fn in_transaction(&self) -> bool {
        self.undo.lock().is_some()
    }

    pub fn savepoint_depth(&self) -> usize {
        self.savepoints.lock().len()
    }

    /// Position of the innermost savepoint called `name`.
    fn savepoint_index(
        savepoints: &[(String, MemoryState)],
        name: &str,
    ) -> Result<usize, FrameGraphError> {
        savepoints
            .iter()
            .rposition(|(open, _)| open == name)
            .ok_or_else(|| FrameGraphError::transaction(format!("no savepoint named {name}")))
    }
}

impl GraphAdapter for MemoryAdapter {
    fn create_vertex(&self) -> Result<VertexId, FrameGraphError> {
        let mut state = self.state.write();
        state.next_vertex += 1;
        let id = VertexId(state.next_vertex);
        state.vertices.insert(id, VertexSlot::default());
        Ok(id)
    }

    fn create_edge(
        &self,
        label: &str,
        tail: VertexId,
        head: VertexId,
    ) -> Result<EdgeId, FrameGraphError> {
        validate_label(label)?;
        let mut state = self.state.write();
        for endpoint in [tail, head] {
            if !state.vertices.contains_key(&endpoint) {
                return Err(FrameGraphError::stale(Element::Vertex(endpoint).to_string()));
            }
        }
        state.next_edge += 1;
        let id = EdgeId(state.next_edge);
        let record = EdgeRecord {
            id,
            label: label.to_string(),
            tail,
            head,
        };
        state.edges.insert(
            id,
            EdgeSlot {
                record,
                properties: BTreeMap::new(),
            },
        );
        if let Some(slot) = state.vertices.get_mut(&tail) {
            slot.outgoing.push(id);
        }
        if let Some(slot) = state.vertices.get_mut(&head) {
            slot.incoming.push(id);
        }
        Ok(id)
    }

    fn remove_vertex(&self, id: VertexId) -> Result<(), FrameGraphError> {
        let mut state = self.state.write();
        let slot = state
            .vertices
            .get(&id)
            .cloned()
            .ok_or_else(|| FrameGraphError::stale(Element::Vertex(id).to_string()))?;
        for edge in slot.outgoing.iter().chain(slot.incoming.iter()) {
            state.detach_edge(*edge);
        }
        state.vertices.remove(&id);
        Ok(())
    }

    fn remove_edge(&self, id: EdgeId) -> Result<(), FrameGraphError> {
        self.state
            .write()
            .detach_edge(id)
            .map(|_| ())
            .ok_or_else(|| FrameGraphError::stale(Element::Edge(id).to_string()))
    }

    fn get_property(&self, element: Element, key: &str) -> Result<Option<Value>, FrameGraphError> {
        Ok(self.state.read().properties(element)?.get(key).cloned())
    }

    fn set_property(
        &self,
        element: Element,
        key: &str,
        value: Value,
    ) -> Result<(), FrameGraphError> {
        validate_key(key)?;
        if value.is_null() {
            self.remove_property(element, key)?;
            return Ok(());
        }
        validate_value(key, &value)?;
        self.state
            .write()
            .properties_mut(element)?
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove_property(
        &self,
        element: Element,
        key: &str,
    ) -> Result<Option<Value>, FrameGraphError> {
        Ok(self.state.write().properties_mut(element)?.remove(key))
    }

    fn properties(&self, element: Element) -> Result<BTreeMap<String, Value>, FrameGraphError> {
        Ok(self.state.read().properties(element)?.clone())
    }

    fn edge(&self, id: EdgeId) -> Result<EdgeRecord, FrameGraphError> {
        self.state
            .read()
            .edges
            .get(&id)
            .map(|slot| slot.record.clone())
            .ok_or_else(|| FrameGraphError::stale(Element::Edge(id).to_string()))
    }

    fn contains(&self, element: Element) -> Result<bool, FrameGraphError> {
        let state = self.state.read();
        Ok(match element {
            Element::Vertex(id) => state.vertices.contains_key(&id),
            Element::Edge(id) => state.edges.contains_key(&id),
        })
    }

    fn adjacent_edges(
        &self,
        vertex: VertexId,
        direction: Direction,
        labels: &[&str],
    ) -> Result<Vec<EdgeRecord>, FrameGraphError> {
        let state = self.state.read();
        let slot = state
            .vertices
            .get(&vertex)
            .ok_or_else(|| FrameGraphError::stale(Element::Vertex(vertex).to_string()))?;
        let mut edges = Vec::new();
        if matches!(direction, Direction::Out | Direction::Both) {
            state.collect(&slot.outgoing, labels, &mut edges);
        }
        if matches!(direction, Direction::In | Direction::Both) {
            state.collect(&slot.incoming, labels, &mut edges);
        }
        Ok(edges)
    }

    fn vertex_ids(&self) -> Result<Vec<VertexId>, FrameGraphError> {
        Ok(self.state.read().vertices.keys().copied().collect())
    }

    fn edge_ids(&self) -> Result<Vec<EdgeId>, FrameGraphError> {
        Ok(self.state.read().edges.keys().copied().collect())
    }

    fn begin(&self) -> Result<(), FrameGraphError> {
        let mut undo = self.undo.lock();
        if undo.is_some() {
            return Err(FrameGraphError::transaction(
                "memory adapter transaction already active",
            ));
        }
        *undo = Some(self.state.read().clone());
        debug!("memory transaction started");
        Ok(())
    }

    fn commit(&self) -> Result<(), FrameGraphError> {
        if self.undo.lock().take().is_none() {
            return Err(FrameGraphError::transaction("no active memory transaction"));
        }
        self.savepoints.lock().clear();
        debug!("memory transaction committed");
        Ok(())
    }

    fn rollback(&self) -> Result<(), FrameGraphError> {
        let snapshot = self
            .undo
            .lock()
            .take()
            .ok_or_else(|| FrameGraphError::transaction("no active memory transaction"))?;
        self.savepoints.lock().clear();
        *self.state.write() = snapshot;
        warn!("memory transaction rolled back");
        Ok(())
    }

    fn savepoint(&self, name: &str) -> Result<(), FrameGraphError> {
        validate_savepoint(name)?;
        if !self.in_transaction() {
            return Err(FrameGraphError::transaction(
                "savepoint requires an active memory transaction",
            ));
        }
        let snapshot = self.state.read().clone();
        self.savepoints.lock().push((name.to_string(), snapshot));
        debug!(savepoint = name, "memory savepoint opened");
        Ok(())
    }

    fn release_savepoint(&self, name: &str) -> Result<(), FrameGraphError> {
        let mut savepoints = self.savepoints.lock();
        let index = Self::savepoint_index(&savepoints, name)?;
        savepoints.truncate(index);
        Ok(())
    }

    fn rollback_to_savepoint(&self, name: &str) -> Result<(), FrameGraphError> {
        let mut savepoints = self.savepoints.lock();
        let index = Self::savepoint_index(&savepoints, name)?;
        let (_, snapshot) = savepoints.split_off(index).swap_remove(0);
        *self.state.write() = snapshot;
        debug!(savepoint = name, "memory savepoint rolled back");
        Ok(())
    }
}
