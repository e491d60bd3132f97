use super::{format_timestamp, Importer};
use crate::graph::{GraphSink, Label, NodeMatch, RelType, StoreError, Write};
use crate::models::{Channel, RoutingPolicy};

/// Creates a `Channel` and links both endpoint nodes to it with `OPENED`.
#[derive(Debug, Default)]
pub struct ChannelsImporter;

impl Importer for ChannelsImporter {
    type Record = Channel;
    const KIND: &'static str = "channel";

    fn import_record(
        &self,
        sink: &mut dyn GraphSink,
        channel: &Channel,
    ) -> Result<u64, StoreError> {
        // The channel row has to exist before anything can point at it
        let mut created = sink.apply(&channel_write(channel))?;
        created += sink.apply_batch(&opened_writes(channel))?;
        Ok(created)
    }
}

pub fn channel_write(channel: &Channel) -> Write {
    Write::create(Label::Channel)
        .with_property("ChannelID", channel.channel_id)
        .with_property("ChanPoint", channel.chan_point.as_str())
        .with_property(
            "LastUpdate",
            format_timestamp(i64::from(channel.last_update)),
        )
        .with_property("Capacity", channel.capacity)
}

/// `OPENED` from node1 and node2, each with its own side's policy.
pub fn opened_writes(channel: &Channel) -> [Write; 2] {
    [
        opened(channel, &channel.node1_pub, channel.node1_policy.as_ref()),
        opened(channel, &channel.node2_pub, channel.node2_policy.as_ref()),
    ]
}

fn opened(channel: &Channel, pub_key: &str, policy: Option<&RoutingPolicy>) -> Write {
    let policy = policy.cloned().unwrap_or_default();
    Write::relate(
        NodeMatch::equals(Label::Node, "PubKey", pub_key),
        RelType::Opened,
        NodeMatch::equals(Label::Channel, "ChannelID", channel.channel_id),
    )
    .with_property("TimeLockDelta", policy.time_lock_delta)
    .with_property("MinHtlc", policy.min_htlc)
    .with_property("FeeBaseMsat", policy.fee_base_msat)
    .with_property("FeeRateMilliMsat", policy.fee_rate_milli_msat)
    .with_property("Disabled", policy.disabled)
}
