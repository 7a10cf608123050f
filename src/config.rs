//! Configuration for adapter selection and adapter-specific options.
//!
//! [`open_framed_graph`] is the single entry point that turns a
//! [`FrameGraphConfig`] into a ready [`FramedGraph`].

use std::{collections::HashMap, path::Path};

use tracing::debug;

use crate::{
    adapter::MemoryAdapter,
    errors::FrameGraphError,
    graph::FramedGraph,
    resolver::{DEFAULT_TYPE_KEY, PolymorphicTypeResolver, TypeRegistry},
};

#[cfg(feature = "sqlite-adapter")]
use crate::adapter::SqliteAdapter;

/// Storage adapter backing a [`FramedGraph`].
///
/// # Examples
///
/// ```rust
/// use framegraph::{AdapterKind, FrameGraphConfig};
///
/// let cfg = FrameGraphConfig::new(AdapterKind::Memory);
/// assert_eq!(cfg.adapter, AdapterKind::Memory);
/// assert_eq!(FrameGraphConfig::default().adapter, AdapterKind::Sqlite);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AdapterKind {
    /// SQLite file or in-memory database through rusqlite.
    #[default]
    Sqlite,
    /// Process-local maps. Nothing is persisted; the path is ignored.
    Memory,
}

/// Options for the SQLite adapter.
///
/// ```rust
/// use framegraph::SqliteConfig;
/// let config = SqliteConfig::default();
/// assert!(config.cache_size.is_none());
/// assert!(config.pragma_settings.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SqliteConfig {
    /// Capacity of the prepared statement cache. `None` keeps the adapter default.
    pub cache_size: Option<usize>,

    /// Extra `PRAGMA key = value` settings applied right after opening.
    ///
    /// ```rust
    /// use framegraph::FrameGraphConfig;
    ///
    /// let mut cfg = FrameGraphConfig::sqlite();
    /// cfg.sqlite
    ///     .pragma_settings
    ///     .insert("synchronous".to_string(), "NORMAL".to_string());
    /// ```
    pub pragma_settings: HashMap<String, String>,
}

/// Complete configuration for opening a framed graph.
#[derive(Clone, Debug)]
pub struct FrameGraphConfig {
    pub adapter: AdapterKind,
    /// Only read when `adapter` is [`AdapterKind::Sqlite`].
    pub sqlite: SqliteConfig,
    /// Property key holding type discriminators.
    pub type_key: String,
}

impl FrameGraphConfig {
    pub fn new(adapter: AdapterKind) -> Self {
        Self {
            adapter,
            sqlite: SqliteConfig::default(),
            type_key: DEFAULT_TYPE_KEY.to_string(),
        }
    }

    pub fn sqlite() -> Self {
        Self::new(AdapterKind::Sqlite)
    }

    pub fn memory() -> Self {
        Self::new(AdapterKind::Memory)
    }

    pub fn with_type_key<K: Into<String>>(mut self, type_key: K) -> Self {
        self.type_key = type_key.into();
        self
    }
}

impl Default for FrameGraphConfig {
    fn default() -> Self {
        Self::new(AdapterKind::default())
    }
}

/// Opens a framed graph over the configured adapter.
///
/// ```rust
/// use framegraph::{FrameGraphConfig, TypeRegistry, open_framed_graph};
///
/// let graph = open_framed_graph("unused", &FrameGraphConfig::memory(), TypeRegistry::new())?;
/// assert_eq!(graph.vertices().count()?, 0);
/// # Ok::<(), framegraph::FrameGraphError>(())
/// ```
pub fn open_framed_graph<P: AsRef<Path>>(
    path: P,
    cfg: &FrameGraphConfig,
    registry: TypeRegistry,
) -> Result<FramedGraph, FrameGraphError> {
    if cfg.type_key.trim().is_empty() {
        return Err(FrameGraphError::invalid_input("type key must be set"));
    }
    let resolver = PolymorphicTypeResolver::with_type_key(registry, cfg.type_key.clone());
    match cfg.adapter {
        #[cfg(feature = "sqlite-adapter")]
        AdapterKind::Sqlite => {
            let adapter = SqliteAdapter::open(&path)?;
            apply_sqlite_config(&adapter, &cfg.sqlite)?;
            debug!(path = %path.as_ref().display(), "opened sqlite framed graph");
            Ok(FramedGraph::with_resolver(adapter, resolver))
        }
        #[cfg(not(feature = "sqlite-adapter"))]
        AdapterKind::Sqlite => Err(FrameGraphError::connection(
            "sqlite adapter is disabled in this build",
        )),
        AdapterKind::Memory => {
            debug!("opened in-memory framed graph");
            Ok(FramedGraph::with_resolver(MemoryAdapter::new(), resolver))
        }
    }
}

#[cfg(feature = "sqlite-adapter")]
fn apply_sqlite_config(
    adapter: &SqliteAdapter,
    cfg: &SqliteConfig,
) -> Result<(), FrameGraphError> {
    let conn = adapter.connection();
    if let Some(capacity) = cfg.cache_size {
        conn.set_prepared_statement_cache_capacity(capacity);
    }
    for (key, value) in cfg.sqlite_pragmas() {
        let pragma_sql = format!("PRAGMA {key} = {value}");
        match conn.execute(&pragma_sql, []) {
            Ok(_) => {}
            // Some PRAGMAs report the new value as a row.
            Err(rusqlite::Error::ExecuteReturnedResults) => {}
            Err(e) => {
                return Err(FrameGraphError::connection(format!(
                    "PRAGMA {key} = {value}: {e}"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(feature = "sqlite-adapter")]
impl SqliteConfig {
    /// PRAGMAs in key order, so they apply deterministically.
    fn sqlite_pragmas(&self) -> Vec<(&str, &str)> {
        let mut pragmas: Vec<(&str, &str)> = self
            .pragma_settings
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        pragmas.sort_unstable();
        pragmas
    }
}
