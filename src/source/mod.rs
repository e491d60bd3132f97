//! Where records come from
//!
//! A [`Source`] hands out each entity kind once. `None` means the kind was
//! not requested and its import step is skipped.

pub mod json;
#[cfg(feature = "lnd")]
pub mod lnd;

pub use json::{JsonInputs, JsonSource};
#[cfg(feature = "lnd")]
pub use lnd::LndSource;

use std::path::PathBuf;
use thiserror::Error;

use crate::models::{GraphSnapshot, PeerSet, Transaction};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {what} from {}", path.display())]
    Decode {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("only one input can be read from stdin")]
    MultipleStdin,

    #[error("peers need the local node's public key (pass --getinfo)")]
    PeersWithoutInfo,

    #[error("failed to connect to lnd at {address}: {message}")]
    Connect { address: String, message: String },

    #[error("lnd {call} failed: {message}")]
    Rpc {
        call: &'static str,
        message: String,
    },
}

/// Supplies records for each import step.
pub trait Source {
    /// Human readable origin, for logs.
    fn describe(&self) -> String;

    /// Nodes and channels of the channel graph.
    fn graph(&mut self) -> Result<Option<GraphSnapshot>, SourceError>;

    /// On-chain wallet transactions.
    fn transactions(&mut self) -> Result<Option<Vec<Transaction>>, SourceError>;

    /// Connected peers and the local node's key.
    fn peers(&mut self) -> Result<Option<PeerSet>, SourceError>;
}
