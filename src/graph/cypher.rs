//! Cypher rendering of store-neutral writes
//!
//! Every write statement ends in `RETURN count(..) AS created` so the caller
//! can tell a relationship MATCH that found nothing from one that did work.
//! Labels, relationship types and property keys come from the schema and
//! importers, never from input data; values always travel as parameters.

use serde_json::Value;

use super::schema::{IndexSpec, Label, RelType};
use super::write::{MatchOp, NodeMatch, Properties, Write};

/// Removes all nodes and relationships but keeps indexes.
pub const DELETE_ALL: &str = "MATCH (n) DETACH DELETE n";

/// A Cypher query with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub text: String,
    pub params: Vec<(String, Value)>,
}

/// Render a write as a single statement returning `created`.
pub fn render(write: &Write) -> Statement {
    match write {
        Write::CreateNode { label, properties } => {
            let mut params = Vec::new();
            let map = property_map(properties, &mut params);
            Statement {
                text: format!("CREATE (n:{label}{map}) RETURN count(n) AS created"),
                params,
            }
        }
        Write::Relate {
            from,
            to,
            rel,
            properties,
            ..
        } => {
            let mut params = Vec::new();
            let from_cond = condition("a", from, "match_from", &mut params);
            let to_cond = condition("b", to, "match_to", &mut params);
            let map = property_map(properties, &mut params);
            Statement {
                text: format!(
                    "MATCH (a:{}), (b:{}) WHERE {from_cond} AND {to_cond} \
                     CREATE (a)-[r:{rel}{map}]->(b) RETURN count(r) AS created",
                    from.label, to.label
                ),
                params,
            }
        }
    }
}

/// `CREATE INDEX <name> IF NOT EXISTS FOR (n:<Label>) ON (n.<Prop>)`
pub fn create_index(index: &IndexSpec) -> String {
    format!(
        "CREATE INDEX {} IF NOT EXISTS FOR (n:{}) ON (n.{})",
        index.name(),
        index.label,
        index.property
    )
}

/// Index statements for one schema transaction, in declaration order.
pub fn create_indexes(indexes: &[IndexSpec]) -> Vec<String> {
    indexes.iter().map(create_index).collect()
}

pub fn count_nodes(label: Label) -> String {
    format!("MATCH (n:{label}) RETURN count(n) AS created")
}

pub fn count_relationships(rel: RelType) -> String {
    format!("MATCH ()-[r:{rel}]->() RETURN count(r) AS created")
}

fn condition(
    var: &str,
    m: &NodeMatch,
    param: &str,
    params: &mut Vec<(String, Value)>,
) -> String {
    match &m.op {
        MatchOp::Equals(v) => {
            params.push((param.to_string(), v.clone()));
            format!("{var}.{} = ${param}", m.property)
        }
        MatchOp::StartsWith(prefix) => {
            params.push((param.to_string(), Value::String(prefix.clone())));
            format!("{var}.{} STARTS WITH ${param}", m.property)
        }
    }
}

fn property_map(properties: &Properties, params: &mut Vec<(String, Value)>) -> String {
    if properties.is_empty() {
        return String::new();
    }
    let fields: Vec<String> = properties
        .iter()
        .map(|(key, value)| {
            params.push((key.clone(), value.clone()));
            format!("{key}: ${key}")
        })
        .collect();
    format!(" {{{}}}", fields.join(", "))
}
