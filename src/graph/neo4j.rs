//! Neo4j backend over bolt
//!
//! neo4rs is async; the importers are plain threads. The store owns a small
//! tokio runtime and blocks on each call, so from the outside every write is
//! a blocking round trip like any other sink.

use neo4rs::{query, BoltNull, BoltType, Graph, Query, Txn};
use serde_json::Value;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use super::cypher::{self, Statement};
use super::schema::{IndexSpec, Label, RelType};
use super::traits::{GraphCounts, GraphSink};
use super::write::{Expect, Write};
use super::{Credentials, StoreError};

pub struct Neo4jStore {
    runtime: Runtime,
    graph: Graph,
    url: String,
}

impl Neo4jStore {
    /// Connect to a Neo4j server.
    pub fn connect(url: &str, credentials: &Credentials) -> Result<Self, StoreError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(StoreError::Runtime)?;

        let graph = runtime.block_on(Graph::new(
            url,
            credentials.user.as_str(),
            credentials.password.as_str(),
        ))?;
        info!("Connected to Neo4j at {}", url);

        Ok(Self {
            runtime,
            graph,
            url: url.to_string(),
        })
    }

    fn run_plain(&self, text: &str) -> Result<(), StoreError> {
        debug!("cypher: {}", text);
        self.runtime.block_on(self.graph.run(query(text)))?;
        Ok(())
    }

    fn fetch_count(&self, text: String) -> Result<u64, StoreError> {
        let stmt = Statement {
            text,
            params: Vec::new(),
        };
        self.runtime.block_on(async {
            let mut txn = self.graph.start_txn().await?;
            let count = execute_counted(&mut txn, &stmt).await;
            match count {
                Ok(n) => {
                    txn.commit().await?;
                    Ok(n)
                }
                Err(e) => {
                    let _ = txn.rollback().await;
                    Err(e)
                }
            }
        })
    }

    /// Run writes in one transaction, rolling back on the first failure.
    fn apply_in_txn(&self, writes: &[Write]) -> Result<u64, StoreError> {
        self.runtime.block_on(async {
            let mut txn = self.graph.start_txn().await?;
            let mut created = 0;
            for write in writes {
                match apply_one(&mut txn, write).await {
                    Ok(n) => created += n,
                    Err(e) => {
                        let _ = txn.rollback().await;
                        return Err(e);
                    }
                }
            }
            txn.commit().await?;
            Ok(created)
        })
    }
}

async fn apply_one(txn: &mut Txn, write: &Write) -> Result<u64, StoreError> {
    let stmt = cypher::render(write);
    let created = execute_counted(txn, &stmt).await?;

    if let Write::Relate {
        from,
        to,
        rel,
        expect: Expect::AtLeastOne,
        ..
    } = write
    {
        if created == 0 {
            return Err(StoreError::MissingEndpoint {
                rel: *rel,
                from: from.to_string(),
                to: to.to_string(),
            });
        }
    }
    Ok(created)
}

/// Execute a statement whose single row carries a `created` count.
async fn execute_counted(txn: &mut Txn, stmt: &Statement) -> Result<u64, StoreError> {
    debug!("cypher: {}", stmt.text);
    let mut rows = txn.execute(to_query(stmt)?).await?;
    let mut created = 0u64;
    while let Some(row) = rows.next(txn.handle()).await? {
        let n: i64 = row
            .get("created")
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        created += u64::try_from(n).map_err(|_| StoreError::Decode(format!("count {n}")))?;
    }
    Ok(created)
}

fn to_query(stmt: &Statement) -> Result<Query, StoreError> {
    let mut q = query(&stmt.text);
    for (key, value) in &stmt.params {
        q = q.param(key, to_bolt(value)?);
    }
    Ok(q)
}

/// Convert a JSON value to a bolt parameter. Bolt integers are signed, so
/// u64 values above `i64::MAX` are rejected instead of wrapping.
fn to_bolt(value: &Value) -> Result<BoltType, StoreError> {
    Ok(match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => BoltType::from(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                BoltType::from(i)
            } else if let Some(u) = n.as_u64() {
                return Err(StoreError::IntegerOutOfRange(u));
            } else {
                BoltType::from(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => BoltType::from(s.as_str()),
        other => BoltType::from(other.to_string()),
    })
}

impl GraphSink for Neo4jStore {
    fn describe(&self) -> String {
        format!("neo4j at {}", self.url)
    }

    fn delete_all(&mut self) -> Result<(), StoreError> {
        self.run_plain(cypher::DELETE_ALL)
    }

    fn create_indexes(&mut self, indexes: &[IndexSpec]) -> Result<(), StoreError> {
        let statements = cypher::create_indexes(indexes);
        debug!("cypher: {} index statements", statements.len());
        self.runtime.block_on(async {
            let mut txn = self.graph.start_txn().await?;
            let queries = statements.iter().map(|text| query(text));
            if let Err(e) = txn.run_queries(queries).await {
                let _ = txn.rollback().await;
                return Err(e.into());
            }
            txn.commit().await?;
            Ok(())
        })
    }

    fn apply(&mut self, write: &Write) -> Result<u64, StoreError> {
        self.apply_in_txn(std::slice::from_ref(write))
    }

    fn apply_batch(&mut self, writes: &[Write]) -> Result<u64, StoreError> {
        self.apply_in_txn(writes)
    }

    fn counts(&mut self) -> Result<GraphCounts, StoreError> {
        let mut counts = GraphCounts::default();
        for label in Label::ALL {
            counts
                .nodes
                .insert(label, self.fetch_count(cypher::count_nodes(label))?);
        }
        for rel in RelType::ALL {
            counts
                .relationships
                .insert(rel, self.fetch_count(cypher::count_relationships(rel))?);
        }
        Ok(counts)
    }
}
