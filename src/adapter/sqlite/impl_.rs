use std::{collections::BTreeMap, path::Path};

use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::{
    adapter::{
        GraphAdapter, label_selected, validate_key, validate_label, validate_savepoint,
        validate_value,
    },
    cache::AdjacencyCache,
    errors::FrameGraphError,
    schema::ensure_schema,
    types::{Direction, EdgeId, EdgeRecord, Element, VertexId},
};

use super::helpers::{
    EDGE_OWNER, INCOMING_SQL, OUTGOING_SQL, VERTEX_OWNER, decode_value, encode_value, owner,
    query_err, row_to_edge, tx_err,
};

/// Property graph stored in a single SQLite connection.
pub struct SqliteAdapter {
    conn: Connection,
    outgoing_cache: AdjacencyCache,
    incoming_cache: AdjacencyCache,
}

impl SqliteAdapter {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FrameGraphError> {
        let conn =
            Connection::open(path).map_err(|e| FrameGraphError::connection(e.to_string()))?;
        ensure_schema(&conn)?;
        Ok(Self::from_connection(conn, false))
    }

    pub fn open_in_memory() -> Result<Self, FrameGraphError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| FrameGraphError::connection(e.to_string()))?;
        ensure_schema(&conn)?;
        Ok(Self::from_connection(conn, true))
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn invalidate_caches(&self) {
        self.outgoing_cache.clear();
        self.incoming_cache.clear();
    }

    fn from_connection(conn: Connection, in_memory: bool) -> Self {
        conn.set_prepared_statement_cache_capacity(128);
        if !in_memory {
            if conn.pragma_update(None, "journal_mode", "WAL").is_err() {
                // Some filesystems refuse WAL; DELETE is always available.
                let _ = conn.pragma_update(None, "journal_mode", "DELETE");
            }
            let _ = conn.pragma_update(None, "synchronous", "NORMAL");
            let _ = conn.pragma_update(None, "temp_store", "MEMORY");
        }
        Self {
            conn,
            outgoing_cache: AdjacencyCache::new(),
            incoming_cache: AdjacencyCache::new(),
        }
    }

    fn vertex_exists(&self, id: VertexId) -> Result<bool, FrameGraphError> {
        let exists: Option<i64> = self
            .conn
            .prepare_cached("SELECT 1 FROM graph_vertices WHERE id=?1")
            .map_err(query_err)?
            .query_row(params![id.0], |row| row.get(0))
            .optional()
            .map_err(query_err)?;
        Ok(exists.is_some())
    }

    fn edge_exists(&self, id: EdgeId) -> Result<bool, FrameGraphError> {
        let exists: Option<i64> = self
            .conn
            .prepare_cached("SELECT 1 FROM graph_edges WHERE id=?1")
            .map_err(query_err)?
            .query_row(params![id.0], |row| row.get(0))
            .optional()
            .map_err(query_err)?;
        Ok(exists.is_some())
    }

    fn ensure_live(&self, element: Element) -> Result<(), FrameGraphError> {
        if self.contains(element)? {
            Ok(())
        } else {
            Err(FrameGraphError::stale(element.to_string()))
        }
    }

    fn fetch_adjacency(
        &self,
        vertex: VertexId,
        direction: Direction,
    ) -> Result<Vec<EdgeRecord>, FrameGraphError> {
        let (cache, sql) = match direction {
            Direction::Out => (&self.outgoing_cache, OUTGOING_SQL),
            Direction::In => (&self.incoming_cache, INCOMING_SQL),
            Direction::Both => {
                let mut edges = self.fetch_adjacency(vertex, Direction::Out)?;
                edges.extend(self.fetch_adjacency(vertex, Direction::In)?);
                return Ok(edges);
            }
        };
        if let Some(cached) = cache.get(vertex) {
            trace!(vertex = vertex.0, ?direction, "adjacency cache hit");
            return Ok(cached);
        }
        let mut stmt = self.conn.prepare_cached(sql).map_err(query_err)?;
        let rows = stmt
            .query_map(params![vertex.0], row_to_edge)
            .map_err(query_err)?;
        let mut edges = Vec::new();
        for row in rows {
            edges.push(row.map_err(query_err)?);
        }
        cache.insert(vertex, edges.clone());
        Ok(edges)
    }

    /// Runs `f` inside a savepoint so multi-statement removals stay atomic even
    /// outside an explicit transaction.
    fn with_savepoint<R>(
        &self,
        name: &str,
        f: impl FnOnce() -> Result<R, FrameGraphError>,
    ) -> Result<R, FrameGraphError> {
        self.savepoint(name)?;
        match f() {
            Ok(result) => {
                self.release_savepoint(name)?;
                Ok(result)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback_to_savepoint(name) {
                    warn!(savepoint = name, error = %rollback_err, "savepoint rollback failed");
                }
                Err(err)
            }
        }
    }
}

impl GraphAdapter for SqliteAdapter {
    fn create_vertex(&self) -> Result<VertexId, FrameGraphError> {
        self.conn
            .execute("INSERT INTO graph_vertices DEFAULT VALUES", [])
            .map_err(query_err)?;
        Ok(VertexId(self.conn.last_insert_rowid()))
    }

    fn create_edge(
        &self,
        label: &str,
        tail: VertexId,
        head: VertexId,
    ) -> Result<EdgeId, FrameGraphError> {
        validate_label(label)?;
        for endpoint in [tail, head] {
            if !self.vertex_exists(endpoint)? {
                return Err(FrameGraphError::stale(Element::Vertex(endpoint).to_string()));
            }
        }
        self.conn
            .execute(
                "INSERT INTO graph_edges(tail_id, head_id, label) VALUES(?1, ?2, ?3)",
                params![tail.0, head.0, label],
            )
            .map_err(query_err)?;
        self.invalidate_caches();
        Ok(EdgeId(self.conn.last_insert_rowid()))
    }

    fn remove_vertex(&self, id: VertexId) -> Result<(), FrameGraphError> {
        if !self.vertex_exists(id)? {
            return Err(FrameGraphError::stale(Element::Vertex(id).to_string()));
        }
        self.with_savepoint("remove_vertex", || {
            self.conn
                .execute(
                    "DELETE FROM graph_properties WHERE owner_kind=?1 AND owner_id IN \
                     (SELECT id FROM graph_edges WHERE tail_id=?2 OR head_id=?2)",
                    params![EDGE_OWNER, id.0],
                )
                .map_err(query_err)?;
            self.conn
                .execute(
                    "DELETE FROM graph_edges WHERE tail_id=?1 OR head_id=?1",
                    params![id.0],
                )
                .map_err(query_err)?;
            self.conn
                .execute(
                    "DELETE FROM graph_properties WHERE owner_kind=?1 AND owner_id=?2",
                    params![VERTEX_OWNER, id.0],
                )
                .map_err(query_err)?;
            self.conn
                .execute("DELETE FROM graph_vertices WHERE id=?1", params![id.0])
                .map_err(query_err)?;
            Ok(())
        })?;
        self.invalidate_caches();
        Ok(())
    }

    fn remove_edge(&self, id: EdgeId) -> Result<(), FrameGraphError> {
        self.with_savepoint("remove_edge", || {
            let affected = self
                .conn
                .execute("DELETE FROM graph_edges WHERE id=?1", params![id.0])
                .map_err(query_err)?;
            if affected == 0 {
                return Err(FrameGraphError::stale(Element::Edge(id).to_string()));
            }
            self.conn
                .execute(
                    "DELETE FROM graph_properties WHERE owner_kind=?1 AND owner_id=?2",
                    params![EDGE_OWNER, id.0],
                )
                .map_err(query_err)?;
            Ok(())
        })?;
        self.invalidate_caches();
        Ok(())
    }

    fn get_property(&self, element: Element, key: &str) -> Result<Option<Value>, FrameGraphError> {
        let (kind, id) = owner(element);
        let raw: Option<String> = self
            .conn
            .prepare_cached(
                "SELECT value FROM graph_properties WHERE owner_kind=?1 AND owner_id=?2 AND key=?3",
            )
            .map_err(query_err)?
            .query_row(params![kind, id, key], |row| row.get(0))
            .optional()
            .map_err(query_err)?;
        match raw {
            Some(raw) => Ok(Some(decode_value(&raw)?)),
            None => {
                self.ensure_live(element)?;
                Ok(None)
            }
        }
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
        self.ensure_live(element)?;
        let (kind, id) = owner(element);
        let encoded = encode_value(&value)?;
        self.conn
            .prepare_cached(
                "INSERT INTO graph_properties(owner_kind, owner_id, key, value) VALUES(?1, ?2, ?3, ?4) \
                 ON CONFLICT(owner_kind, owner_id, key) DO UPDATE SET value=excluded.value",
            )
            .map_err(query_err)?
            .execute(params![kind, id, key, encoded])
            .map_err(query_err)?;
        Ok(())
    }

    fn remove_property(
        &self,
        element: Element,
        key: &str,
    ) -> Result<Option<Value>, FrameGraphError> {
        let previous = self.get_property(element, key)?;
        if previous.is_some() {
            let (kind, id) = owner(element);
            self.conn
                .execute(
                    "DELETE FROM graph_properties WHERE owner_kind=?1 AND owner_id=?2 AND key=?3",
                    params![kind, id, key],
                )
                .map_err(query_err)?;
        }
        Ok(previous)
    }

    fn properties(&self, element: Element) -> Result<BTreeMap<String, Value>, FrameGraphError> {
        self.ensure_live(element)?;
        let (kind, id) = owner(element);
        let mut stmt = self
            .conn
            .prepare_cached(
                "SELECT key, value FROM graph_properties WHERE owner_kind=?1 AND owner_id=?2 ORDER BY key",
            )
            .map_err(query_err)?;
        let rows = stmt
            .query_map(params![kind, id], |row| {
                let key: String = row.get(0)?;
                let value: String = row.get(1)?;
                Ok((key, value))
            })
            .map_err(query_err)?;
        let mut props = BTreeMap::new();
        for row in rows {
            let (key, raw) = row.map_err(query_err)?;
            props.insert(key, decode_value(&raw)?);
        }
        Ok(props)
    }

    fn edge(&self, id: EdgeId) -> Result<EdgeRecord, FrameGraphError> {
        self.conn
            .prepare_cached("SELECT id, tail_id, head_id, label FROM graph_edges WHERE id=?1")
            .map_err(query_err)?
            .query_row(params![id.0], row_to_edge)
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => {
                    FrameGraphError::stale(Element::Edge(id).to_string())
                }
                other => query_err(other),
            })
    }

    fn contains(&self, element: Element) -> Result<bool, FrameGraphError> {
        match element {
            Element::Vertex(id) => self.vertex_exists(id),
            Element::Edge(id) => self.edge_exists(id),
        }
    }

    fn adjacent_edges(
        &self,
        vertex: VertexId,
        direction: Direction,
        labels: &[&str],
    ) -> Result<Vec<EdgeRecord>, FrameGraphError> {
        let cached = match direction {
            Direction::Out => self.outgoing_cache.get(vertex).is_some(),
            Direction::In => self.incoming_cache.get(vertex).is_some(),
            Direction::Both => false,
        };
        if !cached && !self.vertex_exists(vertex)? {
            return Err(FrameGraphError::stale(Element::Vertex(vertex).to_string()));
        }
        let mut edges = self.fetch_adjacency(vertex, direction)?;
        edges.retain(|edge| label_selected(labels, &edge.label));
        Ok(edges)
    }

    fn vertex_ids(&self) -> Result<Vec<VertexId>, FrameGraphError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id FROM graph_vertices ORDER BY id")
            .map_err(query_err)?;
        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(query_err)?;
        let mut ids = Vec::new();
        for id in rows {
            ids.push(VertexId(id.map_err(query_err)?));
        }
        Ok(ids)
    }

    fn edge_ids(&self) -> Result<Vec<EdgeId>, FrameGraphError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id FROM graph_edges ORDER BY id")
            .map_err(query_err)?;
        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(query_err)?;
        let mut ids = Vec::new();
        for id in rows {
            ids.push(EdgeId(id.map_err(query_err)?));
        }
        Ok(ids)
    }

    fn begin(&self) -> Result<(), FrameGraphError> {
        self.conn.execute_batch("BEGIN IMMEDIATE").map_err(tx_err)?;
        debug!("sqlite transaction started");
        Ok(())
    }

    fn commit(&self) -> Result<(), FrameGraphError> {
        self.conn.execute_batch("COMMIT").map_err(tx_err)?;
        debug!("sqlite transaction committed");
        Ok(())
    }

    fn rollback(&self) -> Result<(), FrameGraphError> {
        let result = self.conn.execute_batch("ROLLBACK").map_err(tx_err);
        self.invalidate_caches();
        warn!("sqlite transaction rolled back");
        result
    }

    fn savepoint(&self, name: &str) -> Result<(), FrameGraphError> {
        validate_savepoint(name)?;
        self.conn
            .execute_batch(&format!("SAVEPOINT {name}"))
            .map_err(tx_err)?;
        trace!(savepoint = name, "sqlite savepoint opened");
        Ok(())
    }

    fn release_savepoint(&self, name: &str) -> Result<(), FrameGraphError> {
        validate_savepoint(name)?;
        self.conn
            .execute_batch(&format!("RELEASE {name}"))
            .map_err(tx_err)
    }

    fn rollback_to_savepoint(&self, name: &str) -> Result<(), FrameGraphError> {
        validate_savepoint(name)?;
        let result = self
            .conn
            .execute_batch(&format!("ROLLBACK TO {name}; RELEASE {name}"))
            .map_err(tx_err);
        self.invalidate_caches();
        debug!(savepoint = name, "sqlite savepoint rolled back");
        result
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_adjacency_cache_is_invalidated_by_edge_mutation() {
        let adapter = SqliteAdapter::open_in_memory().expect("adapter");
        let a = adapter.create_vertex().expect("a");
        let b = adapter.create_vertex().expect("b");
        adapter.create_edge("knows", a, b).expect("edge");
        assert_eq!(adapter.adjacent_edges(a, Direction::Out, &[]).unwrap().len(), 1);
        assert_eq!(adapter.outgoing_cache.len(), 1);

        adapter.create_edge("knows", a, b).expect("second edge");
        assert!(adapter.outgoing_cache.is_empty());
        assert_eq!(adapter.adjacent_edges(a, Direction::Out, &[]).unwrap().len(), 2);
    }

    #[test]
    fn test_rollback_discards_writes_and_cache() {
        let adapter = SqliteAdapter::open_in_memory().expect("adapter");
        let a = adapter.create_vertex().expect("a");
        let b = adapter.create_vertex().expect("b");

        adapter.begin().expect("begin");
        adapter.create_edge("knows", a, b).expect("edge");
        adapter
            .set_property(Element::Vertex(a), "name", json!("Bryn"))
            .expect("prop");
        assert_eq!(adapter.adjacent_edges(a, Direction::Out, &[]).unwrap().len(), 1);
        adapter.rollback().expect("rollback");

        assert!(adapter.adjacent_edges(a, Direction::Out, &[]).unwrap().is_empty());
        assert_eq!(
            adapter.get_property(Element::Vertex(a), "name").unwrap(),
            None
        );
    }

    #[test]
    fn test_savepoint_rollback_inside_transaction() {
        let adapter = SqliteAdapter::open_in_memory().expect("adapter");
        let a = adapter.create_vertex().expect("a");
        let b = adapter.create_vertex().expect("b");

        adapter.begin().expect("begin");
        adapter.create_edge("knows", a, b).expect("kept edge");
        adapter.savepoint("unit_1").expect("savepoint");
        adapter.create_edge("likes", a, b).expect("doomed edge");
        assert_eq!(adapter.adjacent_edges(a, Direction::Out, &[]).unwrap().len(), 2);
        adapter.rollback_to_savepoint("unit_1").expect("rollback to");
        adapter.commit().expect("commit");

        let out = adapter.adjacent_edges(a, Direction::Out, &[]).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].label, "knows");
        assert!(adapter.rollback_to_savepoint("unit_1").is_err());
        assert!(matches!(
            adapter.savepoint("bad name"),
            Err(FrameGraphError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_failed_removal_closes_its_savepoint() {
        let adapter = SqliteAdapter::open_in_memory().expect("adapter");
        assert!(matches!(
            adapter.remove_edge(EdgeId(99)),
            Err(FrameGraphError::StaleFrame(_))
        ));
        adapter.begin().expect("no savepoint left open");
        adapter.rollback().expect("rollback");
    }

    #[test]
    fn test_remove_vertex_drops_incident_edge_properties() {
        let adapter = SqliteAdapter::open_in_memory().expect("adapter");
        let a = adapter.create_vertex().expect("a");
        let b = adapter.create_vertex().expect("b");
        let edge = adapter.create_edge("knows", a, b).expect("edge");
        adapter
            .set_property(Element::Edge(edge), "years", json!(15))
            .expect("prop");

        adapter.remove_vertex(b).expect("remove");
        let leftover: i64 = adapter
            .connection()
            .query_row("SELECT COUNT(*) FROM graph_properties", [], |row| row.get(0))
            .expect("count");
        assert_eq!(leftover, 0);
        assert!(!adapter.contains(Element::Edge(edge)).unwrap());
    }
}
