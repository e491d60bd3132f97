use super::{format_timestamp, join_addresses, Importer};
use crate::graph::{GraphSink, Label, NodeMatch, RelType, StoreError, Write};
use crate::models::Transaction;

/// Creates a `Transaction` and links it to the channels it funded.
#[derive(Debug, Default)]
pub struct TransactionsImporter;

impl Importer for TransactionsImporter {
    type Record = Transaction;
    const KIND: &'static str = "transaction";

    fn import_record(
        &self,
        sink: &mut dyn GraphSink,
        tx: &Transaction,
    ) -> Result<u64, StoreError> {
        let mut created = sink.apply(&transaction_write(tx))?;
        if let Some(funded) = funded_write(tx) {
            created += sink.apply(&funded)?;
        }
        Ok(created)
    }
}

pub fn transaction_write(tx: &Transaction) -> Write {
    Write::create(Label::Transaction)
        .with_property("TxHash", tx.tx_hash.as_str())
        // The sign only says which way funds moved
        .with_property("Amount", tx.amount.unsigned_abs())
        .with_property("NumConfirmations", tx.num_confirmations)
        .with_property("BlockHash", tx.block_hash.as_str())
        .with_property("BlockHeight", tx.block_height)
        .with_property("TimeStamp", format_timestamp(tx.time_stamp))
        .with_property("TotalFees", tx.total_fees)
        .with_property("Addresses", join_addresses(&tx.dest_addresses))
}

/// `FUNDED` to every channel whose outpoint starts with the hash.
///
/// A funding outpoint is `<hash>:<index>`, so this is a prefix match and may
/// find nothing. Returns `None` for an empty hash, which would match all.
pub fn funded_write(tx: &Transaction) -> Option<Write> {
    if tx.tx_hash.is_empty() {
        return None;
    }
    Some(
        Write::relate(
            NodeMatch::equals(Label::Transaction, "TxHash", tx.tx_hash.as_str()),
            RelType::Funded,
            NodeMatch::starts_with(Label::Channel, "ChanPoint", tx.tx_hash.as_str()),
        )
        .optional(),
    )
}
