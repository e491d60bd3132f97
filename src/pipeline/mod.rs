//! Import pipeline
//!
//! Runs one full import against a graph sink:
//! 1. Delete existing data (unless disabled)
//! 2. Create lookup indexes
//! 3. Nodes, then channels (channels reference nodes)
//! 4. Transactions (linked to channels by funding outpoint)
//! 5. Peers (reference nodes)
//!
//! Each step writes on its own thread while this thread drives the progress
//! bar. The first error ends the run; the sink is flushed either way.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::bootstrap;
use crate::graph::GraphSink;
use crate::importers::{
    import_all, ChannelsImporter, ImportReport, Importer, NodesImporter, PeersImporter,
    TransactionsImporter,
};
use crate::progress;
use crate::source::Source;

/// Full import pipeline.
pub struct Pipeline<'a> {
    sink: &'a mut dyn GraphSink,
    /// Whether to wipe the store before importing
    delete_existing: bool,
    /// Whether to draw progress bars
    show_progress: bool,
}

impl<'a> Pipeline<'a> {
    /// Create a new pipeline writing to `sink`.
    pub fn new(sink: &'a mut dyn GraphSink) -> Self {
        Self {
            sink,
            delete_existing: true,
            show_progress: true,
        }
    }

    /// Keep whatever the store already holds.
    pub fn keep_existing(mut self) -> Self {
        self.delete_existing = false;
        self
    }

    /// Hide progress bars.
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Run every phase, then flush the sink.
    pub fn run(&mut self, source: &mut dyn Source) -> Result<ImportStats> {
        info!(
            "Importing from {} into {}",
            source.describe(),
            self.sink.describe()
        );

        let mut stats = ImportStats::default();
        let result = self.run_phases(source, &mut stats);

        // Keep what was written before a failure
        let flushed = self.sink.flush().context("failed to flush graph store");
        if let (Err(_), Err(e)) = (&result, &flushed) {
            warn!("{:#}", e);
        }

        result?;
        flushed?;
        Ok(stats)
    }

    fn run_phases(&mut self, source: &mut dyn Source, stats: &mut ImportStats) -> Result<()> {
        if self.delete_existing {
            bootstrap::delete_all(self.sink).context("failed to delete existing graph")?;
        }
        bootstrap::create_indexes(self.sink).context("failed to create indexes")?;

        if let Some(graph) = source.graph().context("failed to load channel graph")? {
            let report = self.step(&NodesImporter, &graph.nodes, "Nodes")?;
            stats.created += report.created;
            stats.nodes = Some(report.records);

            let report = self.step(&ChannelsImporter, &graph.channels, "Channels")?;
            stats.created += report.created;
            stats.channels = Some(report.records);
        }

        if let Some(transactions) = source
            .transactions()
            .context("failed to load transactions")?
        {
            let report = self.step(&TransactionsImporter, &transactions, "Transactions")?;
            stats.created += report.created;
            stats.transactions = Some(report.records);
        }

        if let Some(set) = source.peers().context("failed to load peers")? {
            let importer = PeersImporter::new(set.local_pubkey);
            let report = self.step(&importer, &set.peers, "Peers")?;
            stats.created += report.created;
            stats.peers = Some(report.records);
        }

        Ok(())
    }

    /// Import one entity kind with a progress bar.
    fn step<I: Importer>(
        &mut self,
        importer: &I,
        records: &[I::Record],
        message: &str,
    ) -> Result<ImportReport> {
        info!("Importing {} {} records", records.len(), I::KIND);

        let bar = progress::step_bar(records.len(), message, self.show_progress);
        let sink: &mut dyn GraphSink = &mut *self.sink;
        let outcome = progress::run_step(I::KIND, &bar, move |tx| {
            import_all(importer, sink, records, tx)
        })?;
        bar.finish_and_clear();

        let report = outcome.result?;
        info!(
            "{}: {} records, {} created",
            message, report.records, report.created
        );
        Ok(report)
    }
}

/// Statistics from one import run.
///
/// A count is `None` when its entity kind was not part of the input.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ImportStats {
    pub nodes: Option<usize>,
    pub channels: Option<usize>,
    pub transactions: Option<usize>,
    pub peers: Option<usize>,
    /// Nodes and relationships created
    pub created: u64,
}

impl ImportStats {
    /// Get a summary string.
    pub fn summary(&self) -> String {
        let parts: Vec<String> = [
            ("nodes", self.nodes),
            ("channels", self.channels),
            ("transactions", self.transactions),
            ("peers", self.peers),
        ]
        .into_iter()
        .filter_map(|(name, count)| count.map(|n| format!("{n} {name}")))
        .collect();

        if parts.is_empty() {
            return "nothing imported".to_string();
        }
        format!("{} ({} created)", parts.join(", "), self.created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Label, LocalStore, RelType, INDEXES};
    use crate::models::{Channel, GraphSnapshot, Node, PeerSet, RoutingPolicy, Transaction};
    use crate::source::SourceError;

    /// Records handed out from memory.
    #[derive(Default, Clone)]
    struct FixedSource {
        graph: Option<GraphSnapshot>,
        transactions: Option<Vec<Transaction>>,
        peers: Option<PeerSet>,
    }

    impl Source for FixedSource {
        fn describe(&self) -> String {
            "fixture".to_string()
        }

        fn graph(&mut self) -> Result<Option<GraphSnapshot>, SourceError> {
            Ok(self.graph.clone())
        }

        fn transactions(&mut self) -> Result<Option<Vec<Transaction>>, SourceError> {
            Ok(self.transactions.clone())
        }

        fn peers(&mut self) -> Result<Option<PeerSet>, SourceError> {
            Ok(self.peers.clone())
        }
    }

    fn node(pub_key: &str) -> Node {
        Node {
            pub_key: pub_key.into(),
            alias: format!("alias-{pub_key}"),
            ..Default::default()
        }
    }

    fn policy(time_lock_delta: u32) -> RoutingPolicy {
        RoutingPolicy {
            time_lock_delta,
            min_htlc: 1000,
            fee_base_msat: 1000,
            fee_rate_milli_msat: 1,
            disabled: false,
        }
    }

    fn two_node_graph() -> GraphSnapshot {
        GraphSnapshot {
            nodes: vec![node("pubkeyA"), node("pubkeyB")],
            channels: vec![Channel {
                channel_id: 42,
                chan_point: "abc123:0".into(),
                node1_pub: "pubkeyA".into(),
                node2_pub: "pubkeyB".into(),
                capacity: 1_000_000,
                node1_policy: Some(policy(40)),
                node2_policy: Some(policy(144)),
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_two_nodes_one_channel() {
        let mut store = LocalStore::in_memory();
        let mut source = FixedSource {
            graph: Some(two_node_graph()),
            ..Default::default()
        };

        let stats = Pipeline::new(&mut store)
            .without_progress()
            .run(&mut source)
            .unwrap();
        assert_eq!(stats.nodes, Some(2));
        assert_eq!(stats.channels, Some(1));
        assert_eq!(stats.transactions, None);

        assert_eq!(store.nodes(Label::Node).len(), 2);
        let channels = store.nodes(Label::Channel);
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].get_i64("Capacity"), Some(1_000_000));

        let mut opened: Vec<(String, i64)> = store
            .relationships(RelType::Opened)
            .into_iter()
            .map(|(src, edge, dst)| {
                assert_eq!(dst.get_u64("ChannelID"), Some(42));
                (
                    src.get_str("PubKey").unwrap_or_default().to_string(),
                    edge.get_i64("TimeLockDelta").unwrap_or_default(),
                )
            })
            .collect();
        opened.sort();
        assert_eq!(
            opened,
            vec![("pubkeyA".to_string(), 40), ("pubkeyB".to_string(), 144)]
        );
    }

    #[test]
    fn test_channel_with_unknown_node_fails() {
        let mut graph = two_node_graph();
        graph.nodes.truncate(1);

        let mut store = LocalStore::in_memory();
        let mut source = FixedSource {
            graph: Some(graph),
            ..Default::default()
        };

        let err = Pipeline::new(&mut store)
            .without_progress()
            .run(&mut source)
            .unwrap_err();
        assert!(format!("{err:#}").contains("pubkeyB"));

        // No orphan relationship, and the channel row was written first
        assert_eq!(store.relationships(RelType::Opened).len(), 0);
        assert_eq!(store.nodes(Label::Channel).len(), 1);
    }

    #[test]
    fn test_funded_by_prefix() {
        let mut store = LocalStore::in_memory();
        let tx = |hash: &str, amount| Transaction {
            tx_hash: hash.into(),
            amount,
            ..Default::default()
        };
        let mut source = FixedSource {
            graph: Some(two_node_graph()),
            transactions: Some(vec![tx("abc123", -50_000), tx("xyz999", 50_000)]),
            ..Default::default()
        };

        Pipeline::new(&mut store)
            .without_progress()
            .run(&mut source)
            .unwrap();

        let funded = store.relationships(RelType::Funded);
        assert_eq!(funded.len(), 1);
        assert_eq!(funded[0].0.get_str("TxHash"), Some("abc123"));
        assert_eq!(funded[0].2.get_str("ChanPoint"), Some("abc123:0"));

        for t in store.nodes(Label::Transaction) {
            assert_eq!(t.get_u64("Amount"), Some(50_000));
        }
    }

    #[test]
    fn test_peers_anchor_on_local_node() {
        let mut store = LocalStore::in_memory();
        let mut source = FixedSource {
            graph: Some(two_node_graph()),
            peers: Some(PeerSet {
                local_pubkey: "pubkeyA".into(),
                peers: vec![crate::models::Peer {
                    pub_key: "pubkeyB".into(),
                    ping_time: 2000,
                    ..Default::default()
                }],
            }),
            ..Default::default()
        };

        let stats = Pipeline::new(&mut store)
            .without_progress()
            .run(&mut source)
            .unwrap();
        assert_eq!(stats.peers, Some(1));

        let peers = store.relationships(RelType::Peer);
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].0.get_str("PubKey"), Some("pubkeyA"));
        assert_eq!(peers[0].2.get_str("PubKey"), Some("pubkeyB"));
        assert_eq!(peers[0].1.get_str("PingTime"), Some("2ms"));
    }

    #[test]
    fn test_reimport_is_idempotent() {
        let mut store = LocalStore::in_memory();
        let source = FixedSource {
            graph: Some(two_node_graph()),
            transactions: Some(vec![Transaction {
                tx_hash: "abc123".into(),
                ..Default::default()
            }]),
            ..Default::default()
        };

        let mut first = source.clone();
        Pipeline::new(&mut store)
            .without_progress()
            .run(&mut first)
            .unwrap();
        let after_first = store.counts().unwrap();

        let mut second = source.clone();
        Pipeline::new(&mut store)
            .without_progress()
            .run(&mut second)
            .unwrap();
        let after_second = store.counts().unwrap();

        assert_eq!(after_first, after_second);
        assert_eq!(after_second.total_nodes(), 4);
        assert_eq!(after_second.total_relationships(), 3);
        assert_eq!(store.indexes().len(), INDEXES.len());
    }

    #[test]
    fn test_keep_existing_appends() {
        let mut store = LocalStore::in_memory();
        let source = FixedSource {
            graph: Some(GraphSnapshot {
                nodes: vec![node("pubkeyA")],
                channels: Vec::new(),
            }),
            ..Default::default()
        };

        Pipeline::new(&mut store)
            .without_progress()
            .run(&mut source.clone())
            .unwrap();
        Pipeline::new(&mut store)
            .keep_existing()
            .without_progress()
            .run(&mut source.clone())
            .unwrap();

        assert_eq!(store.nodes(Label::Node).len(), 2);
    }

    #[test]
    fn test_summary() {
        assert_eq!(ImportStats::default().summary(), "nothing imported");
        let stats = ImportStats {
            nodes: Some(2),
            channels: Some(1),
            created: 5,
            ..Default::default()
        };
        assert_eq!(stats.summary(), "2 nodes, 1 channels (5 created)");
    }
}
