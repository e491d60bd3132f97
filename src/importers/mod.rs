//! Importers: one per entity kind
//!
//! An importer turns one source record into graph writes. [`import_all`]
//! is the loop they share: records go in input order, the first failed write
//! ends the step, and every finished record is reported on the progress
//! channel.

pub mod channels;
pub mod nodes;
pub mod peers;
pub mod transactions;

pub use channels::ChannelsImporter;
pub use nodes::NodesImporter;
pub use peers::PeersImporter;
pub use transactions::TransactionsImporter;

use chrono::DateTime;
use crossbeam_channel::Sender;
use thiserror::Error;
use tracing::debug;

use crate::graph::{GraphSink, StoreError};

/// Maps records of one kind onto graph writes.
pub trait Importer: Sync {
    type Record: Sync;

    /// Entity kind, for logs and errors.
    const KIND: &'static str;

    /// Write one record, returning how many nodes and relationships it created.
    fn import_record(
        &self,
        sink: &mut dyn GraphSink,
        record: &Self::Record,
    ) -> Result<u64, StoreError>;
}

/// A record the store refused.
#[derive(Error, Debug)]
#[error("failed to import {kind} #{index}")]
pub struct ImportError {
    pub kind: &'static str,
    /// Zero-based position of the record in its input.
    pub index: usize,
    #[source]
    pub source: StoreError,
}

/// Outcome of a completed import step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub records: usize,
    pub created: u64,
}

/// Import every record, signalling each finished index on `progress`.
///
/// `progress` is consumed: it is dropped when this returns, on success and
/// on error alike, which closes the channel for the consumer.
pub fn import_all<I: Importer>(
    importer: &I,
    sink: &mut dyn GraphSink,
    records: &[I::Record],
    progress: Sender<usize>,
) -> Result<ImportReport, ImportError> {
    let mut report = ImportReport::default();

    for (index, record) in records.iter().enumerate() {
        let created = importer
            .import_record(sink, record)
            .map_err(|source| ImportError {
                kind: I::KIND,
                index,
                source,
            })?;

        report.records += 1;
        report.created += created;
        // Nobody listening is fine, the bar is optional
        let _ = progress.send(index);
    }

    debug!(
        "Imported {} {} records ({} created)",
        report.records,
        I::KIND,
        report.created
    );
    Ok(report)
}

/// Render Unix seconds as `YYYY-MM-DD HH:MM` (UTC).
///
/// Out of range values render as an empty string.
pub fn format_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Comma-join address strings, `""` when there are none.
pub fn join_addresses<S: AsRef<str>>(addresses: &[S]) -> String {
    addresses
        .iter()
        .map(|a| a.as_ref())
        .collect::<Vec<_>>()
        .join(",")
}
