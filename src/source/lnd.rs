//! Live import from an lnd node over gRPC
//!
//! Only built with the `lnd` feature. tonic_lnd is async; like the Neo4j
//! store, the source keeps its own runtime and blocks on each call.

use tokio::runtime::Runtime;
use tonic_lnd::lnrpc;
use tracing::info;

use super::{Source, SourceError};
use crate::config::LndTarget;
use crate::models::{
    Channel, GraphSnapshot, Node, NodeAddress, Peer, PeerSet, RoutingPolicy, Transaction,
};

pub struct LndSource {
    runtime: Runtime,
    client: tonic_lnd::Client,
    address: String,
}

impl LndSource {
    pub fn connect(endpoint: &LndTarget) -> Result<Self, SourceError> {
        let address = if endpoint.address.contains("://") {
            endpoint.address.clone()
        } else {
            format!("https://{}", endpoint.address)
        };
        let connect_err = |message: String| SourceError::Connect {
            address: address.clone(),
            message,
        };

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| connect_err(e.to_string()))?;

        let client = runtime
            .block_on(tonic_lnd::connect(
                address.clone(),
                &endpoint.tls_cert,
                &endpoint.macaroon,
            ))
            .map_err(|e| connect_err(e.to_string()))?;
        info!("Connected to lnd at {}", address);

        Ok(Self {
            runtime,
            client,
            address,
        })
    }
}

fn rpc_err<E: std::fmt::Display>(call: &'static str) -> impl Fn(E) -> SourceError {
    move |status| SourceError::Rpc {
        call,
        message: status.to_string(),
    }
}

impl Source for LndSource {
    fn describe(&self) -> String {
        format!("lnd at {}", self.address)
    }

    fn graph(&mut self) -> Result<Option<GraphSnapshot>, SourceError> {
        let request = lnrpc::ChannelGraphRequest::default();
        let graph = self
            .runtime
            .block_on(self.client.lightning().describe_graph(request))
            .map_err(rpc_err("DescribeGraph"))?
            .into_inner();

        Ok(Some(GraphSnapshot {
            nodes: graph.nodes.into_iter().map(Node::from).collect(),
            channels: graph.edges.into_iter().map(Channel::from).collect(),
        }))
    }

    fn transactions(&mut self) -> Result<Option<Vec<Transaction>>, SourceError> {
        let details = self
            .runtime
            .block_on(
                self.client
                    .lightning()
                    .get_transactions(lnrpc::GetTransactionsRequest::default()),
            )
            .map_err(rpc_err("GetTransactions"))?
            .into_inner();

        Ok(Some(
            details
                .transactions
                .into_iter()
                .map(Transaction::from)
                .collect(),
        ))
    }

    fn peers(&mut self) -> Result<Option<PeerSet>, SourceError> {
        let info = self
            .runtime
            .block_on(self.client.lightning().get_info(lnrpc::GetInfoRequest::default()))
            .map_err(rpc_err("GetInfo"))?
            .into_inner();
        let peers = self
            .runtime
            .block_on(
                self.client
                    .lightning()
                    .list_peers(lnrpc::ListPeersRequest::default()),
            )
            .map_err(rpc_err("ListPeers"))?
            .into_inner();

        Ok(Some(PeerSet {
            local_pubkey: info.identity_pubkey,
            peers: peers.peers.into_iter().map(Peer::from).collect(),
        }))
    }
}

impl From<lnrpc::LightningNode> for Node {
    fn from(n: lnrpc::LightningNode) -> Self {
        Node {
            last_update: n.last_update,
            pub_key: n.pub_key,
            alias: n.alias,
            addresses: n
                .addresses
                .into_iter()
                .map(|a| NodeAddress {
                    network: a.network,
                    addr: a.addr,
                })
                .collect(),
            color: n.color,
        }
    }
}

impl From<lnrpc::RoutingPolicy> for RoutingPolicy {
    fn from(p: lnrpc::RoutingPolicy) -> Self {
        RoutingPolicy {
            time_lock_delta: p.time_lock_delta,
            min_htlc: p.min_htlc,
            fee_base_msat: p.fee_base_msat,
            fee_rate_milli_msat: p.fee_rate_milli_msat,
            disabled: p.disabled,
        }
    }
}

impl From<lnrpc::ChannelEdge> for Channel {
    fn from(e: lnrpc::ChannelEdge) -> Self {
        Channel {
            channel_id: e.channel_id,
            chan_point: e.chan_point,
            last_update: e.last_update,
            node1_pub: e.node1_pub,
            node2_pub: e.node2_pub,
            capacity: e.capacity,
            node1_policy: e.node1_policy.map(RoutingPolicy::from),
            node2_policy: e.node2_policy.map(RoutingPolicy::from),
        }
    }
}

impl From<lnrpc::Transaction> for Transaction {
    fn from(t: lnrpc::Transaction) -> Self {
        Transaction {
            tx_hash: t.tx_hash,
            amount: t.amount,
            num_confirmations: t.num_confirmations,
            block_hash: t.block_hash,
            block_height: t.block_height,
            time_stamp: t.time_stamp,
            total_fees: t.total_fees,
            dest_addresses: t.dest_addresses,
        }
    }
}

impl From<lnrpc::Peer> for Peer {
    fn from(p: lnrpc::Peer) -> Self {
        Peer {
            pub_key: p.pub_key,
            address: p.address,
            bytes_sent: p.bytes_sent,
            bytes_recv: p.bytes_recv,
            sat_sent: p.sat_sent,
            sat_recv: p.sat_recv,
            inbound: p.inbound,
            ping_time: p.ping_time,
        }
    }
}
