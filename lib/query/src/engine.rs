//! Retrieval engine
//!
//! Wires the record store, its spaces, and the current index snapshot
//! together. Ingest rebuilds the index incrementally and swaps the snapshot
//! atomically; concurrent queries read either the old or the new index,
//! never a partially updated one.

use crate::executor::execute;
use crate::index::Index;
use crate::query::{Binding, Query};
use crate::results::ResultSet;
use parking_lot::RwLock;
use rankx_core::{Record, RecordId, Result, Vector};
use rankx_schema::{RecordStore, Schema, Space, SpaceSpec};
use std::sync::Arc;
use tracing::info;

/// In-memory retrieval engine over one record store and one index
pub struct Engine {
    store: RwLock<RecordStore>,
    index: RwLock<Arc<Index>>,
}

impl Engine {
    /// Build an engine from a store and resolved spaces
    ///
    /// The initial index is built eagerly; an empty store yields an empty
    /// index that later `put` calls grow.
    pub fn new(store: RecordStore, spaces: Vec<Space>) -> Result<Self> {
        let index = Arc::new(Index::build(&store, spaces)?);
        info!(
            records = store.len(),
            spaces = index.space_count(),
            "engine ready"
        );
        Ok(Self {
            store: RwLock::new(store),
            index: RwLock::new(index),
        })
    }

    /// Build an engine from declarative space specs
    pub fn from_specs(store: RecordStore, specs: &[SpaceSpec]) -> Result<Self> {
        let spaces = specs
            .iter()
            .map(|spec| Space::from_spec(spec, &store))
            .collect::<Result<Vec<_>>>()?;
        Self::new(store, spaces)
    }

    /// Validate and upsert records, then swap in the successor index
    ///
    /// The batch either fully applies or is fully rejected with every
    /// violation reported; on success only the changed ids are re-embedded.
    pub fn put(&self, records: Vec<Record>) -> Result<Vec<RecordId>> {
        let mut store = self.store.write();
        let changed = store.put(records)?;
        self.swap_index(&store, &changed)?;
        Ok(changed)
    }

    /// Validate and upsert JSON rows, then swap in the successor index
    pub fn put_json(&self, rows: Vec<serde_json::Value>) -> Result<Vec<RecordId>> {
        let mut store = self.store.write();
        let changed = store.put_json(rows)?;
        self.swap_index(&store, &changed)?;
        Ok(changed)
    }

    fn swap_index(&self, store: &RecordStore, changed: &[RecordId]) -> Result<()> {
        let current = self.index.read().clone();
        let next = Arc::new(current.rebuilt_with(store, changed)?);
        *self.index.write() = next;
        info!(
            changed = changed.len(),
            records = store.len(),
            "index snapshot swapped"
        );
        Ok(())
    }

    /// Execute a bound query against the current snapshot
    pub fn search(&self, query: &Query, binding: &Binding) -> Result<ResultSet> {
        let store = self.store.read();
        let index = self.index.read().clone();
        execute(query, binding, &index, &store)
    }

    /// The current frozen index snapshot
    pub fn snapshot(&self) -> Arc<Index> {
        self.index.read().clone()
    }

    pub fn schema(&self) -> Schema {
        self.store.read().schema().clone()
    }

    pub fn record_count(&self) -> usize {
        self.store.read().len()
    }

    pub fn get(&self, id: &RecordId) -> Option<Record> {
        self.store.read().get(id).cloned()
    }

    /// Composite vectors for the external projection collaborator
    pub fn composite_vectors(
        &self,
        subset: Option<&[RecordId]>,
    ) -> Result<Vec<(RecordId, Vector)>> {
        self.snapshot().composite_vectors(subset)
    }
}
