use ahash::AHashMap;
use parking_lot::RwLock;

use crate::types::{EdgeRecord, VertexId};

/// Per-vertex adjacency cache holding every incident edge of one direction in native order.
#[derive(Default)]
pub struct AdjacencyCache {
    inner: RwLock<AHashMap<VertexId, Vec<EdgeRecord>>>,
}

impl AdjacencyCache {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(AHashMap::new()),
        }
    }

    pub fn get(&self, key: VertexId) -> Option<Vec<EdgeRecord>> {
        self.inner.read().get(&key).cloned()
    }

    pub fn insert(&self, key: VertexId, value: Vec<EdgeRecord>) {
        self.inner.write().insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}
