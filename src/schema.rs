use rusqlite::{Connection, OptionalExtension};

use crate::errors::FrameGraphError;

pub const SCHEMA_VERSION: i64 = 1;

pub fn ensure_schema(conn: &Connection) -> Result<(), FrameGraphError> {
    ensure_base_schema(conn)?;
    ensure_meta(conn)?;
    Ok(())
}

fn ensure_base_schema(conn: &Connection) -> Result<(), FrameGraphError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS graph_vertices (
            id        INTEGER PRIMARY KEY AUTOINCREMENT
        );
        CREATE TABLE IF NOT EXISTS graph_edges (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            tail_id   INTEGER NOT NULL,
            head_id   INTEGER NOT NULL,
            label     TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS graph_properties (
            owner_kind INTEGER NOT NULL,
            owner_id   INTEGER NOT NULL,
            key        TEXT NOT NULL,
            value      TEXT NOT NULL,
            PRIMARY KEY (owner_kind, owner_id, key)
        );
        CREATE INDEX IF NOT EXISTS idx_edges_tail ON graph_edges(tail_id, id);
        CREATE INDEX IF NOT EXISTS idx_edges_head ON graph_edges(head_id, id);
        CREATE INDEX IF NOT EXISTS idx_edges_label ON graph_edges(label);
        CREATE INDEX IF NOT EXISTS idx_props_key_value ON graph_properties(key, value);
        CREATE TABLE IF NOT EXISTS graph_meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            schema_version INTEGER NOT NULL
        );
        "#,
    )
    .map_err(|e| FrameGraphError::schema(e.to_string()))
}

fn ensure_meta(conn: &Connection) -> Result<(), FrameGraphError> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT schema_version FROM graph_meta WHERE id=1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| FrameGraphError::schema(e.to_string()))?;
    match existing {
        None => {
            conn.execute(
                "INSERT INTO graph_meta(id, schema_version) VALUES(1, ?1)",
                [SCHEMA_VERSION],
            )
            .map_err(|e| FrameGraphError::schema(e.to_string()))?;
            Ok(())
        }
        Some(version) if version > SCHEMA_VERSION => Err(FrameGraphError::schema(format!(
            "database schema version {version} is newer than supported version {SCHEMA_VERSION}"
        ))),
        Some(_) => Ok(()),
    }
}

pub fn read_schema_version(conn: &Connection) -> Result<i64, FrameGraphError> {
    conn.query_row(
        "SELECT schema_version FROM graph_meta WHERE id=1",
        [],
        |row| row.get(0),
    )
    .map_err(|e| FrameGraphError::schema(e.to_string()))
}
