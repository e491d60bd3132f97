//! Store bootstrap: reset and index setup before an import

use tracing::info;

use crate::graph::{GraphSink, StoreError, INDEXES};

/// Remove every node and relationship. Indexes are left in place.
pub fn delete_all(sink: &mut dyn GraphSink) -> Result<(), StoreError> {
    info!("Deleting all nodes and relationships in {}", sink.describe());
    sink.delete_all()
}

/// Request the lookup indexes the importers match on.
///
/// Neo4j builds indexes in the background; this returns once creation has
/// been requested, not when the indexes are online.
pub fn create_indexes(sink: &mut dyn GraphSink) -> Result<(), StoreError> {
    info!("Creating {} indexes", INDEXES.len());
    for index in INDEXES {
        tracing::debug!("index {} on {}", index.name(), index);
    }
    sink.create_indexes(INDEXES)
}
