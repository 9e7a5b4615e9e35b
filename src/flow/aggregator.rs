//! Packet-to-flow aggregation pass

use std::collections::HashMap;

use tracing::debug;

use crate::core::{FlowAccumulator, FlowKey, FlowRecord, PacketDescriptor};

/// Aggregate a packet sequence into flow summary records.
///
/// Packets are grouped by exact 5-tuple match. Only TCP/UDP packets are
/// aggregated; everything else (ICMP, tunneled protocols, fragments) is
/// skipped without error since mixed traffic is the normal case, not a
/// malformed input. Records are emitted in first-seen key order.
///
/// The aggregator holds no state across invocations; an empty input
/// yields an empty output.
pub fn aggregate(packets: &[PacketDescriptor]) -> Vec<FlowRecord> {
    let mut flows: HashMap<FlowKey, FlowAccumulator> = HashMap::new();
    let mut order: Vec<FlowKey> = Vec::new();
    let mut skipped = 0u64;

    for pkt in packets {
        if !pkt.protocol.is_recognized() {
            skipped += 1;
            continue;
        }

        let key = FlowKey::from_packet(pkt);
        match flows.get_mut(&key) {
            Some(acc) => acc.update(pkt),
            None => {
                flows.insert(key.clone(), FlowAccumulator::new(pkt));
                order.push(key);
            }
        }
    }

    debug!(
        "Aggregated {} packets into {} flows ({} skipped)",
        packets.len(),
        order.len(),
        skipped
    );

    order
        .into_iter()
        .filter_map(|key| flows.remove(&key).map(|acc| acc.into_record(key)))
        .collect()
}
