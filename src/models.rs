//! Core data models for lngraph
//!
//! Normalized records for everything we import from a Lightning node. Both
//! source modes produce these: JSON snapshots decode straight into them and
//! gRPC responses are converted with `From` impls in `source::lnd`.
//!
//! `lncli` prints 64-bit integers as JSON strings (`"capacity": "1000000"`).
//! Those fields go through [`stringified`], which accepts either encoding and
//! writes strings back, so a decode/encode round trip loses nothing.

use serde::{Deserialize, Serialize};

/// A network address advertised by a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NodeAddress {
    pub network: String,
    pub addr: String,
}

/// A Lightning node as seen in the channel graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Node {
    pub last_update: u32,
    pub pub_key: String,
    pub alias: String,
    pub addresses: Vec<NodeAddress>,
    pub color: String,
}

/// Fee and timing parameters one endpoint advertises for a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RoutingPolicy {
    pub time_lock_delta: u32,
    #[serde(with = "stringified")]
    pub min_htlc: i64,
    #[serde(with = "stringified")]
    pub fee_base_msat: i64,
    #[serde(with = "stringified")]
    pub fee_rate_milli_msat: i64,
    pub disabled: bool,
}

/// A channel edge between two nodes.
///
/// A policy is `None` when the endpoint never announced one (`null` in
/// `lncli` output). It is imported with zero values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Channel {
    #[serde(with = "stringified")]
    pub channel_id: u64,
    pub chan_point: String,
    pub last_update: u32,
    pub node1_pub: String,
    pub node2_pub: String,
    #[serde(with = "stringified")]
    pub capacity: i64,
    pub node1_policy: Option<RoutingPolicy>,
    pub node2_policy: Option<RoutingPolicy>,
}

/// An on-chain transaction known to the node's wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Transaction {
    pub tx_hash: String,
    /// Negative for funds leaving the wallet.
    #[serde(with = "stringified")]
    pub amount: i64,
    pub num_confirmations: i32,
    pub block_hash: String,
    pub block_height: i32,
    #[serde(with = "stringified")]
    pub time_stamp: i64,
    #[serde(with = "stringified")]
    pub total_fees: i64,
    pub dest_addresses: Vec<String>,
}

/// A connected peer of the local node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Peer {
    pub pub_key: String,
    pub address: String,
    #[serde(with = "stringified")]
    pub bytes_sent: u64,
    #[serde(with = "stringified")]
    pub bytes_recv: u64,
    #[serde(with = "stringified")]
    pub sat_sent: i64,
    #[serde(with = "stringified")]
    pub sat_recv: i64,
    pub inbound: bool,
    /// Round trip time in microseconds, as lnd reports it.
    #[serde(with = "stringified")]
    pub ping_time: i64,
}

/// The parts of `lncli getinfo` we need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NodeInfo {
    pub identity_pubkey: String,
    pub alias: String,
}

/// `lncli describegraph` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    #[serde(rename = "edges")]
    pub channels: Vec<Channel>,
}

/// `lncli listchaintxns` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TransactionList {
    pub transactions: Vec<Transaction>,
}

/// `lncli listpeers` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PeerList {
    pub peers: Vec<Peer>,
}

/// Peers together with the public key of the node they are connected to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PeerSet {
    pub local_pubkey: String,
    pub peers: Vec<Peer>,
}

/// Serde adapter for integers that `lncli` encodes as strings.
pub mod stringified {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr<T> {
        Number(T),
        Text(String),
    }

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr + Deserialize<'de>,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        match Repr::<T>::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n),
            Repr::Text(s) => s
                .trim()
                .parse()
                .map_err(|e| D::Error::custom(format!("invalid integer {s:?}: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn describegraph_fixture() -> serde_json::Value {
        json!({
            "nodes": [
                {
                    "last_update": 1548000000,
                    "pub_key": "02aa",
                    "alias": "alice",
                    "addresses": [
                        {"network": "tcp", "addr": "10.0.0.1:9735"},
                        {"network": "tcp", "addr": "abcd.onion:9735"}
                    ],
                    "color": "#3399ff"
                }
            ],
            "edges": [
                {
                    "channel_id": "618177322587078656",
                    "chan_point": "abc123:0",
                    "last_update": 1548000100,
                    "node1_pub": "02aa",
                    "node2_pub": "03bb",
                    "capacity": "1000000",
                    "node1_policy": {
                        "time_lock_delta": 144,
                        "min_htlc": "1000",
                        "fee_base_msat": "1000",
                        "fee_rate_milli_msat": "1",
                        "disabled": false
                    },
                    "node2_policy": null
                }
            ]
        })
    }

    #[test]
    fn test_decode_lncli_graph() {
        let graph: GraphSnapshot = serde_json::from_value(describegraph_fixture()).unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].addresses.len(), 2);
        assert_eq!(graph.channels[0].channel_id, 618177322587078656);
        assert_eq!(graph.channels[0].capacity, 1_000_000);
        let policy = graph.channels[0].node1_policy.as_ref().unwrap();
        assert_eq!(policy.time_lock_delta, 144);
        assert_eq!(policy.min_htlc, 1000);
        assert!(graph.channels[0].node2_policy.is_none());
    }

    #[test]
    fn test_graph_round_trip_is_lossless() {
        let original = describegraph_fixture();
        let graph: GraphSnapshot = serde_json::from_value(original.clone()).unwrap();
        let encoded = serde_json::to_value(&graph).unwrap();
        assert_eq!(encoded, original);
    }

    #[test]
    fn test_transactions_round_trip_is_lossless() {
        let original = json!({
            "transactions": [{
                "tx_hash": "abc123",
                "amount": "-50000",
                "num_confirmations": 6,
                "block_hash": "0000000000000000000abc",
                "block_height": 560000,
                "time_stamp": "1548000000",
                "total_fees": "250",
                "dest_addresses": ["bc1qxyz", "bc1qabc"]
            }]
        });
        let list: TransactionList = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(list.transactions[0].amount, -50_000);
        assert_eq!(serde_json::to_value(&list).unwrap(), original);
    }

    #[test]
    fn test_empty_address_lists_survive_round_trip() {
        let graph = json!({
            "nodes": [{
                "last_update": 1547990000,
                "pub_key": "03bb",
                "alias": "bob",
                "addresses": [],
                "color": "#000000"
            }],
            "edges": []
        });
        let decoded: GraphSnapshot = serde_json::from_value(graph.clone()).unwrap();
        assert_eq!(serde_json::to_value(&decoded).unwrap(), graph);

        let txns = json!({
            "transactions": [{
                "tx_hash": "abc",
                "amount": "0",
                "num_confirmations": 0,
                "block_hash": "",
                "block_height": 0,
                "time_stamp": "0",
                "total_fees": "0",
                "dest_addresses": []
            }]
        });
        let decoded: TransactionList = serde_json::from_value(txns.clone()).unwrap();
        assert_eq!(serde_json::to_value(&decoded).unwrap(), txns);
    }

    #[test]
    fn test_peers_accept_numbers_and_strings() {
        let list: PeerList = serde_json::from_value(json!({
            "peers": [
                {"pub_key": "03bb", "bytes_sent": "10", "bytes_recv": 20, "ping_time": "1500", "inbound": true},
                {"pub_key": "04cc", "sat_sent": -3}
            ]
        }))
        .unwrap();
        assert_eq!(list.peers[0].bytes_sent, 10);
        assert_eq!(list.peers[0].bytes_recv, 20);
        assert_eq!(list.peers[0].ping_time, 1500);
        assert!(list.peers[0].inbound);
        assert_eq!(list.peers[1].sat_sent, -3);
        assert_eq!(list.peers[1].address, "");
    }

    #[test]
    fn test_invalid_integer_string_is_rejected() {
        let result = serde_json::from_value::<Channel>(json!({"capacity": "lots"}));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("invalid integer"), "{err}");
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let node: Node = serde_json::from_str(r#"{"pub_key": "02aa"}"#).unwrap();
        assert_eq!(node.pub_key, "02aa");
        assert_eq!(node.last_update, 0);
        assert!(node.addresses.is_empty());
    }

    #[test]
    fn test_getinfo_ignores_unknown_fields() {
        let info: NodeInfo = serde_json::from_str(
            r#"{"version": "0.17.0", "identity_pubkey": "02aa", "alias": "alice", "num_peers": 3}"#,
        )
        .unwrap();
        assert_eq!(info.identity_pubkey, "02aa");
    }
}
