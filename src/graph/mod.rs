//! Graph store access
//!
//! Two backends implement [`GraphSink`]:
//! - [`Neo4jStore`]: a Neo4j server over bolt (neo4rs)
//! - [`LocalStore`]: an embedded petgraph graph persisted with redb
//!
//! Importers only ever see the trait.

pub mod cypher;
pub mod neo4j;
pub mod schema;
pub mod store;
pub mod store_models;
pub mod traits;
pub mod write;

pub use neo4j::Neo4jStore;
pub use schema::{IndexSpec, Label, RelType, INDEXES};
pub use store::LocalStore;
pub use store_models::{GraphEdge, GraphNode};
pub use traits::{GraphCounts, GraphSink};
pub use write::{Expect, MatchOp, NodeMatch, Properties, Write};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by graph stores
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unsupported store url {0:?} (expected bolt://, neo4j://, file://<dir> or memory:)")]
    UnsupportedUrl(String),

    #[error("{rel} relationship not created: no node pair matches {from} -> {to}")]
    MissingEndpoint {
        rel: RelType,
        from: String,
        to: String,
    },

    #[error("value {0} does not fit in a 64-bit signed integer")]
    IntegerOutOfRange(u64),

    #[error("neo4j: {0}")]
    Neo4j(#[from] neo4rs::Error),

    #[error("neo4j returned an unexpected row: {0}")]
    Decode(String),

    #[error("embedded store {path}: {message}")]
    Local { path: PathBuf, message: String },

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Credentials for stores that need them.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Open the store a connection string points at.
///
/// - `bolt://`, `bolt+s://`, `bolt+ssc://`, `neo4j://`, `neo4j+s://`,
///   `neo4j+ssc://`: Neo4j server
/// - `file://<dir>`: embedded store persisted in `<dir>/graph.redb`
/// - `memory:`: embedded store that is dropped at exit
pub fn open(url: &str, credentials: &Credentials) -> Result<Box<dyn GraphSink>, StoreError> {
    const NEO4J_SCHEMES: &[&str] = &[
        "bolt://",
        "bolt+s://",
        "bolt+ssc://",
        "neo4j://",
        "neo4j+s://",
        "neo4j+ssc://",
    ];

    if NEO4J_SCHEMES.iter().any(|s| url.starts_with(s)) {
        return Ok(Box::new(Neo4jStore::connect(url, credentials)?));
    }
    if let Some(path) = url.strip_prefix("file://") {
        if path.is_empty() {
            return Err(StoreError::UnsupportedUrl(url.to_string()));
        }
        return Ok(Box::new(LocalStore::open(path)?));
    }
    if url == "memory:" {
        return Ok(Box::new(LocalStore::in_memory()));
    }
    Err(StoreError::UnsupportedUrl(url.to_string()))
}
