use std::time::Duration;

use super::Importer;
use crate::graph::{GraphSink, Label, NodeMatch, RelType, StoreError, Write};
use crate::models::Peer;

/// Links the local node to each connected peer with `PEER`.
#[derive(Debug)]
pub struct PeersImporter {
    local_pubkey: String,
}

impl PeersImporter {
    pub fn new(local_pubkey: impl Into<String>) -> Self {
        Self {
            local_pubkey: local_pubkey.into(),
        }
    }

    pub fn peer_write(&self, peer: &Peer) -> Write {
        Write::relate(
            NodeMatch::equals(Label::Node, "PubKey", self.local_pubkey.as_str()),
            RelType::Peer,
            NodeMatch::equals(Label::Node, "PubKey", peer.pub_key.as_str()),
        )
        .with_property("Address", peer.address.as_str())
        .with_property("BytesSent", peer.bytes_sent)
        .with_property("BytesRecv", peer.bytes_recv)
        .with_property("SatSent", peer.sat_sent)
        .with_property("SatRecv", peer.sat_recv)
        .with_property("Inbound", peer.inbound)
        .with_property("PingTime", ping_time(peer.ping_time))
    }
}

impl Importer for PeersImporter {
    type Record = Peer;
    const KIND: &'static str = "peer";

    fn import_record(&self, sink: &mut dyn GraphSink, peer: &Peer) -> Result<u64, StoreError> {
        sink.apply(&self.peer_write(peer))
    }
}

/// Render a ping time in microseconds as a duration, e.g. `1.5ms`.
pub fn ping_time(micros: i64) -> String {
    format!("{:?}", Duration::from_micros(micros.max(0).unsigned_abs()))
}
