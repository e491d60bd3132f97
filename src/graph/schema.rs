//! Graph schema: labels, relationship types and lookup indexes
//!
//! Property names are PascalCase to stay compatible with graphs built by
//! earlier lngraph releases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Node labels written by the importers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    Node,
    Channel,
    Transaction,
}

impl Label {
    pub const ALL: [Label; 3] = [Label::Node, Label::Channel, Label::Transaction];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Node => "Node",
            Label::Channel => "Channel",
            Label::Transaction => "Transaction",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Relationship types written by the importers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RelType {
    /// `(:Node)-[:OPENED]->(:Channel)`, one per channel endpoint
    Opened,
    /// `(:Node)-[:PEER]->(:Node)`, local node to a connected peer
    Peer,
    /// `(:Transaction)-[:FUNDED]->(:Channel)`
    Funded,
}

impl RelType {
    pub const ALL: [RelType; 3] = [RelType::Opened, RelType::Peer, RelType::Funded];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelType::Opened => "OPENED",
            RelType::Peer => "PEER",
            RelType::Funded => "FUNDED",
        }
    }
}

impl fmt::Display for RelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single-property index on a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexSpec {
    pub label: Label,
    pub property: &'static str,
}

impl IndexSpec {
    pub const fn new(label: Label, property: &'static str) -> Self {
        Self { label, property }
    }

    /// Stable index name, e.g. `node_pubkey`.
    pub fn name(&self) -> String {
        format!(
            "{}_{}",
            self.label.as_str().to_lowercase(),
            self.property.to_lowercase()
        )
    }
}

impl fmt::Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}({})", self.label, self.property)
    }
}

/// Indexes created before every import.
pub const INDEXES: &[IndexSpec] = &[
    IndexSpec::new(Label::Node, "PubKey"),
    IndexSpec::new(Label::Node, "Alias"),
    IndexSpec::new(Label::Channel, "ChannelID"),
    IndexSpec::new(Label::Channel, "Capacity"),
    IndexSpec::new(Label::Channel, "ChanPoint"),
    IndexSpec::new(Label::Transaction, "TxHash"),
];
