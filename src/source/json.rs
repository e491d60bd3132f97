//! `lncli` JSON output read from files or stdin

use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{Source, SourceError};
use crate::models::{GraphSnapshot, NodeInfo, PeerList, PeerSet, Transaction, TransactionList};

/// Path that means "read standard input".
pub const STDIN: &str = "-";

/// Input files per entity kind.
#[derive(Debug, Clone, Default)]
pub struct JsonInputs {
    /// `lncli describegraph`
    pub graph: Option<PathBuf>,
    /// `lncli listchaintxns`
    pub chaintxns: Option<PathBuf>,
    /// `lncli listpeers`
    pub peers: Option<PathBuf>,
    /// `lncli getinfo`
    pub getinfo: Option<PathBuf>,
}

impl JsonInputs {
    fn all(&self) -> impl Iterator<Item = &PathBuf> {
        [&self.graph, &self.chaintxns, &self.peers, &self.getinfo]
            .into_iter()
            .flatten()
    }
}

#[derive(Debug)]
pub struct JsonSource {
    inputs: JsonInputs,
}

impl JsonSource {
    /// Validate the combination of inputs.
    pub fn new(inputs: JsonInputs) -> Result<Self, SourceError> {
        let from_stdin = inputs.all().filter(|p| is_stdin(p)).count();
        if from_stdin > 1 {
            return Err(SourceError::MultipleStdin);
        }
        if inputs.peers.is_some() && inputs.getinfo.is_none() {
            return Err(SourceError::PeersWithoutInfo);
        }
        Ok(Self { inputs })
    }
}

impl Source for JsonSource {
    fn describe(&self) -> String {
        let files: Vec<String> = self
            .inputs
            .all()
            .map(|p| p.display().to_string())
            .collect();
        if files.is_empty() {
            "no input files".to_string()
        } else {
            format!("json files {}", files.join(", "))
        }
    }

    fn graph(&mut self) -> Result<Option<GraphSnapshot>, SourceError> {
        let Some(path) = &self.inputs.graph else {
            return Ok(None);
        };
        let graph: GraphSnapshot = decode(path, "channel graph")?;
        info!(
            "Read {} nodes and {} channels from {}",
            graph.nodes.len(),
            graph.channels.len(),
            path.display()
        );
        Ok(Some(graph))
    }

    fn transactions(&mut self) -> Result<Option<Vec<Transaction>>, SourceError> {
        let Some(path) = &self.inputs.chaintxns else {
            return Ok(None);
        };
        let list: TransactionList = decode(path, "transactions")?;
        info!(
            "Read {} transactions from {}",
            list.transactions.len(),
            path.display()
        );
        Ok(Some(list.transactions))
    }

    fn peers(&mut self) -> Result<Option<PeerSet>, SourceError> {
        let Some(path) = &self.inputs.peers else {
            return Ok(None);
        };
        let info_path = self
            .inputs
            .getinfo
            .as_ref()
            .ok_or(SourceError::PeersWithoutInfo)?;

        let info: NodeInfo = decode(info_path, "node info")?;
        let list: PeerList = decode(path, "peers")?;
        info!(
            "Read {} peers of {} from {}",
            list.peers.len(),
            info.identity_pubkey,
            path.display()
        );
        Ok(Some(PeerSet {
            local_pubkey: info.identity_pubkey,
            peers: list.peers,
        }))
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN
}

fn read_input(path: &Path) -> Result<String, SourceError> {
    let read_err = |source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    };

    if is_stdin(path) {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(read_err)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).map_err(read_err)
    }
}

fn decode<T: DeserializeOwned>(path: &Path, what: &'static str) -> Result<T, SourceError> {
    let text = read_input(path)?;
    debug!("Decoding {} bytes of {} from {}", text.len(), what, path.display());
    serde_json::from_str(&text).map_err(|source| SourceError::Decode {
        what,
        path: path.to_path_buf(),
        source,
    })
}
