//! Embedded graph store using petgraph + redb
//!
//! Mirrors what the importers rely on from Neo4j: `CREATE` of labelled
//! nodes, cartesian `MATCH ... CREATE` relationships with equality or
//! `STARTS WITH` predicates, `DETACH DELETE` of everything, and property
//! indexes that survive a wipe. The graph lives in memory and is written to
//! `<dir>/graph.redb` on [`GraphSink::flush`].

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use redb::{ReadableTable, TableDefinition};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::schema::{IndexSpec, Label, RelType};
use super::store_models::{GraphEdge, GraphNode};
use super::traits::{GraphCounts, GraphSink};
use super::write::{Expect, MatchOp, NodeMatch, Write};
use super::StoreError;

// redb table definitions
const NODES_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("nodes");
const EDGES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("edges");
const INDEXES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("indexes");

type LookupKey = (Label, String);

/// Embedded graph store
pub struct LocalStore {
    graph: DiGraph<GraphNode, GraphEdge>,
    /// Declared indexes: property value (JSON text) -> nodes
    lookups: HashMap<LookupKey, HashMap<String, Vec<NodeIndex>>>,
    /// Persistence layer (optional)
    db: Option<redb::Database>,
    db_path: Option<PathBuf>,
}

impl LocalStore {
    /// Create or open a store in the given directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let db_file = dir.join("graph.redb");
        let db = redb::Database::create(&db_file).map_err(|e| local_err(&db_file, e))?;

        let mut store = Self {
            graph: DiGraph::new(),
            lookups: HashMap::new(),
            db: Some(db),
            db_path: Some(db_file),
        };
        store.load()?;
        debug!(
            "Opened embedded graph with {} nodes, {} relationships",
            store.node_count(),
            store.edge_count()
        );

        Ok(store)
    }

    /// Create an in-memory only store (no persistence)
    pub fn in_memory() -> Self {
        Self {
            graph: DiGraph::new(),
            lookups: HashMap::new(),
            db: None,
            db_path: None,
        }
    }

    // ==================== Queries ====================

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All nodes with a label
    pub fn nodes(&self, label: Label) -> Vec<&GraphNode> {
        self.graph
            .node_weights()
            .filter(|n| n.label == label)
            .collect()
    }

    /// Nodes selected by a match, in insertion order
    pub fn find_nodes(&self, m: &NodeMatch) -> Vec<&GraphNode> {
        self.select(m)
            .into_iter()
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect()
    }

    /// All relationships of a type as (source, relationship, target)
    pub fn relationships(&self, rel: RelType) -> Vec<(&GraphNode, &GraphEdge, &GraphNode)> {
        self.graph
            .edge_references()
            .filter(|e| e.weight().rel == rel)
            .filter_map(|e| {
                let src = self.graph.node_weight(e.source())?;
                let dst = self.graph.node_weight(e.target())?;
                Some((src, e.weight(), dst))
            })
            .collect()
    }

    /// Declared indexes as (label, property)
    pub fn indexes(&self) -> Vec<LookupKey> {
        let mut keys: Vec<_> = self.lookups.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn select(&self, m: &NodeMatch) -> Vec<NodeIndex> {
        if let MatchOp::Equals(value) = &m.op {
            let key = (m.label, m.property.to_string());
            if let Some(lookup) = self.lookups.get(&key) {
                return lookup.get(&value_key(value)).cloned().unwrap_or_default();
            }
        }
        self.graph
            .node_indices()
            .filter(|&idx| m.matches(self.graph[idx].label, &self.graph[idx].properties))
            .collect()
    }

    // ==================== Writes ====================

    fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        let idx = self.graph.add_node(node);
        let node = &self.graph[idx];
        for ((label, property), lookup) in self.lookups.iter_mut() {
            if *label != node.label {
                continue;
            }
            if let Some(value) = node.properties.get(property) {
                lookup.entry(value_key(value)).or_default().push(idx);
            }
        }
        idx
    }

    fn apply_unchecked(&mut self, write: &Write) -> Result<u64, StoreError> {
        match write {
            Write::CreateNode { label, properties } => {
                self.add_node(GraphNode::new(*label, properties.clone()));
                Ok(1)
            }
            Write::Relate {
                from,
                to,
                rel,
                properties,
                expect,
            } => {
                let sources = self.select(from);
                let targets = self.select(to);
                let mut created = 0u64;
                for &src in &sources {
                    for &dst in &targets {
                        self.graph
                            .add_edge(src, dst, GraphEdge::new(*rel, properties.clone()));
                        created += 1;
                    }
                }
                if created == 0 && *expect == Expect::AtLeastOne {
                    return Err(StoreError::MissingEndpoint {
                        rel: *rel,
                        from: from.to_string(),
                        to: to.to_string(),
                    });
                }
                Ok(created)
            }
        }
    }

    /// Drop everything added after the given node/edge counts.
    ///
    /// Only the tail is removed, so surviving indices stay valid.
    fn rollback_to(&mut self, nodes: usize, edges: usize) {
        while self.graph.edge_count() > edges {
            let last = EdgeIndex::new(self.graph.edge_count() - 1);
            self.graph.remove_edge(last);
        }
        while self.graph.node_count() > nodes {
            let last = NodeIndex::new(self.graph.node_count() - 1);
            if let Some(node) = self.graph.remove_node(last) {
                for ((label, property), lookup) in self.lookups.iter_mut() {
                    if *label != node.label {
                        continue;
                    }
                    if let Some(value) = node.properties.get(property) {
                        if let Some(entries) = lookup.get_mut(&value_key(value)) {
                            entries.retain(|&i| i != last);
                        }
                    }
                }
            }
        }
    }

    // ==================== Persistence ====================

    /// Persist graph to redb
    pub fn save(&self) -> Result<(), StoreError> {
        let (db, path) = match (&self.db, &self.db_path) {
            (Some(db), Some(path)) => (db, path),
            _ => return Ok(()),
        };
        let err = |e: &dyn Display| local_err(path, e);

        let write_txn = db.begin_write().map_err(|e| err(&e))?;
        {
            // Rewrite from scratch so deleted data does not come back
            write_txn.delete_table(NODES_TABLE).map_err(|e| err(&e))?;
            write_txn.delete_table(EDGES_TABLE).map_err(|e| err(&e))?;
            write_txn.delete_table(INDEXES_TABLE).map_err(|e| err(&e))?;

            let mut nodes = write_txn.open_table(NODES_TABLE).map_err(|e| err(&e))?;
            for idx in self.graph.node_indices() {
                let value = serde_json::to_vec(&self.graph[idx])?;
                nodes
                    .insert(idx.index() as u64, value.as_slice())
                    .map_err(|e| err(&e))?;
            }

            let edges: Vec<(u64, u64, &GraphEdge)> = self
                .graph
                .edge_references()
                .map(|e| {
                    (
                        e.source().index() as u64,
                        e.target().index() as u64,
                        e.weight(),
                    )
                })
                .collect();
            let edges_data = serde_json::to_vec(&edges)?;
            let mut edges_table = write_txn.open_table(EDGES_TABLE).map_err(|e| err(&e))?;
            edges_table
                .insert("__edges__", edges_data.as_slice())
                .map_err(|e| err(&e))?;

            let indexes_data = serde_json::to_vec(&self.indexes())?;
            let mut indexes_table = write_txn.open_table(INDEXES_TABLE).map_err(|e| err(&e))?;
            indexes_table
                .insert("__indexes__", indexes_data.as_slice())
                .map_err(|e| err(&e))?;
        }
        write_txn.commit().map_err(|e| err(&e))?;

        debug!("Saved embedded graph to {}", path.display());
        Ok(())
    }

    /// Load graph from redb
    fn load(&mut self) -> Result<(), StoreError> {
        let (db, path) = match (&self.db, &self.db_path) {
            (Some(db), Some(path)) => (db, path.clone()),
            _ => return Ok(()),
        };
        let err = |e: &dyn Display| local_err(&path, e);

        let read_txn = db.begin_read().map_err(|e| err(&e))?;

        let mut declared: Vec<LookupKey> = Vec::new();
        match read_txn.open_table(INDEXES_TABLE) {
            Ok(table) => {
                if let Some(entry) = table.get("__indexes__").map_err(|e| err(&e))? {
                    declared = serde_json::from_slice(entry.value())?;
                }
            }
            Err(redb::TableError::TableDoesNotExist(_)) => {}
            Err(e) => return Err(err(&e)),
        }

        let mut nodes: Vec<GraphNode> = Vec::new();
        match read_txn.open_table(NODES_TABLE) {
            Ok(table) => {
                for item in table.iter().map_err(|e| err(&e))? {
                    let (_, value) = item.map_err(|e| err(&e))?;
                    nodes.push(serde_json::from_slice(value.value())?);
                }
            }
            Err(redb::TableError::TableDoesNotExist(_)) => {}
            Err(e) => return Err(err(&e)),
        }

        let mut edges: Vec<(u64, u64, GraphEdge)> = Vec::new();
        match read_txn.open_table(EDGES_TABLE) {
            Ok(table) => {
                if let Some(entry) = table.get("__edges__").map_err(|e| err(&e))? {
                    edges = serde_json::from_slice(entry.value())?;
                }
            }
            Err(redb::TableError::TableDoesNotExist(_)) => {}
            Err(e) => return Err(err(&e)),
        }
        drop(read_txn);

        for key in declared {
            self.lookups.entry(key).or_default();
        }
        for node in nodes {
            self.add_node(node);
        }
        for (src, dst, edge) in edges {
            let (src, dst) = (NodeIndex::new(src as usize), NodeIndex::new(dst as usize));
            if src.index() < self.graph.node_count() && dst.index() < self.graph.node_count() {
                self.graph.add_edge(src, dst, edge);
            }
        }

        Ok(())
    }
}

/// Lookup key for a property value. JSON text keeps `42` and `"42"` apart.
fn value_key(value: &Value) -> String {
    value.to_string()
}

fn local_err(path: &Path, e: impl Display) -> StoreError {
    StoreError::Local {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

impl GraphSink for LocalStore {
    fn describe(&self) -> String {
        match &self.db_path {
            Some(path) => format!("embedded graph at {}", path.display()),
            None => "in-memory graph".to_string(),
        }
    }

    fn delete_all(&mut self) -> Result<(), StoreError> {
        self.graph.clear();
        for lookup in self.lookups.values_mut() {
            lookup.clear();
        }
        Ok(())
    }

    fn create_indexes(&mut self, indexes: &[IndexSpec]) -> Result<(), StoreError> {
        for index in indexes {
            let key = (index.label, index.property.to_string());
            if self.lookups.contains_key(&key) {
                continue;
            }
            let mut lookup: HashMap<String, Vec<NodeIndex>> = HashMap::new();
            for idx in self.graph.node_indices() {
                let node = &self.graph[idx];
                if node.label != index.label {
                    continue;
                }
                if let Some(value) = node.properties.get(index.property) {
                    lookup.entry(value_key(value)).or_default().push(idx);
                }
            }
            self.lookups.insert(key, lookup);
        }
        Ok(())
    }

    fn apply(&mut self, write: &Write) -> Result<u64, StoreError> {
        self.apply_batch(std::slice::from_ref(write))
    }

    fn apply_batch(&mut self, writes: &[Write]) -> Result<u64, StoreError> {
        let (nodes, edges) = (self.graph.node_count(), self.graph.edge_count());
        let mut created = 0;
        for write in writes {
            match self.apply_unchecked(write) {
                Ok(n) => created += n,
                Err(e) => {
                    self.rollback_to(nodes, edges);
                    return Err(e);
                }
            }
        }
        Ok(created)
    }

    fn counts(&mut self) -> Result<GraphCounts, StoreError> {
        let mut counts = GraphCounts::default();
        for label in Label::ALL {
            counts.nodes.insert(label, 0);
        }
        for rel in RelType::ALL {
            counts.relationships.insert(rel, 0);
        }
        for node in self.graph.node_weights() {
            *counts.nodes.entry(node.label).or_default() += 1;
        }
        for edge in self.graph.edge_weights() {
            *counts.relationships.entry(edge.rel).or_default() += 1;
        }
        Ok(counts)
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.save()
    }
}
