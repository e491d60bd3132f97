//! Graph sink trait shared by all store backends

use std::collections::BTreeMap;

use super::schema::{IndexSpec, Label, RelType};
use super::write::Write;
use super::StoreError;

/// Node and relationship totals of a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphCounts {
    pub nodes: BTreeMap<Label, u64>,
    pub relationships: BTreeMap<RelType, u64>,
}

impl GraphCounts {
    pub fn nodes_of(&self, label: Label) -> u64 {
        self.nodes.get(&label).copied().unwrap_or(0)
    }

    pub fn relationships_of(&self, rel: RelType) -> u64 {
        self.relationships.get(&rel).copied().unwrap_or(0)
    }

    pub fn total_nodes(&self) -> u64 {
        self.nodes.values().sum()
    }

    pub fn total_relationships(&self) -> u64 {
        self.relationships.values().sum()
    }
}

/// A graph store the importers can write to.
///
/// Calls block until the store has answered. One sink is driven by one
/// importer at a time, hence `&mut self` and `Send` (the importer runs on its
/// own thread).
pub trait GraphSink: Send {
    /// Human readable target, for logs.
    fn describe(&self) -> String;

    /// Remove every node and relationship. Indexes are kept.
    fn delete_all(&mut self) -> Result<(), StoreError>;

    /// Request creation of the given indexes. Existing ones are left alone.
    fn create_indexes(&mut self, indexes: &[IndexSpec]) -> Result<(), StoreError>;

    /// Execute one write, returning how many nodes or relationships it created.
    fn apply(&mut self, write: &Write) -> Result<u64, StoreError>;

    /// Execute writes as one unit: either all succeed or the store is left
    /// as it was before the batch.
    fn apply_batch(&mut self, writes: &[Write]) -> Result<u64, StoreError>;

    /// Count nodes per label and relationships per type.
    fn counts(&mut self) -> Result<GraphCounts, StoreError>;

    /// Make everything written so far durable.
    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}
