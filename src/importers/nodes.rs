use super::{format_timestamp, join_addresses, Importer};
use crate::graph::{GraphSink, Label, StoreError, Write};
use crate::models::Node;

/// Creates one `Node` per graph node.
#[derive(Debug, Default)]
pub struct NodesImporter;

impl Importer for NodesImporter {
    type Record = Node;
    const KIND: &'static str = "node";

    fn import_record(&self, sink: &mut dyn GraphSink, node: &Node) -> Result<u64, StoreError> {
        sink.apply(&node_write(node))
    }
}

pub fn node_write(node: &Node) -> Write {
    let addresses: Vec<String> = node
        .addresses
        .iter()
        .map(|a| format!("{}:{}", a.network, a.addr))
        .collect();

    Write::create(Label::Node)
        .with_property("Alias", node.alias.as_str())
        .with_property("PubKey", node.pub_key.as_str())
        .with_property("LastUpdate", format_timestamp(i64::from(node.last_update)))
        .with_property("Color", node.color.as_str())
        .with_property("Addresses", join_addresses(&addresses))
}
