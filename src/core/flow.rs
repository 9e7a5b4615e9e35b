//! Flow identity and summary records
//!
//! A flow is the aggregate of every packet sharing one directional
//! (src, dst, src port, dst port, protocol) identity within a batch.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use super::packet::{PacketDescriptor, TransportProtocol};

/// Unique key identifying a flow (directional 5-tuple)
///
/// Equality is exact-match: the two directions of a conversation are two
/// distinct flows. Keys are never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowKey {
    pub src_ip: IpAddr,
    pub dst_ip: IpAddr,
    pub src_port: u16,
    pub dst_port: u16,
    pub protocol: TransportProtocol,
}

impl FlowKey {
    /// Create from a packet descriptor
    pub fn from_packet(pkt: &PacketDescriptor) -> Self {
        Self {
            src_ip: pkt.src_ip,
            dst_ip: pkt.dst_ip,
            src_port: pkt.src_port,
            dst_port: pkt.dst_port,
            protocol: pkt.protocol,
        }
    }
}

/// Running per-flow statistics, mutated while a batch is being consumed
///
/// `start_time` is written exactly once, on the first packet. `end_time`
/// is last-write-wins in arrival order; packets are not assumed to arrive
/// in timestamp order and no maximum is taken.
#[derive(Debug, Clone)]
pub struct FlowAccumulator {
    packet_count: u64,
    total_bytes: u64,
    start_time: f64,
    end_time: f64,
}

impl FlowAccumulator {
    /// Start a flow from its first packet
    pub fn new(pkt: &PacketDescriptor) -> Self {
        Self {
            packet_count: 1,
            total_bytes: pkt.length,
            start_time: pkt.timestamp,
            end_time: pkt.timestamp,
        }
    }

    /// Fold one more packet with the same key into the flow
    pub fn update(&mut self, pkt: &PacketDescriptor) {
        self.packet_count += 1;
        self.total_bytes += pkt.length;
        self.end_time = pkt.timestamp;
    }

    pub fn packet_count(&self) -> u64 {
        self.packet_count
    }

    /// Finalize into an immutable summary record
    pub fn into_record(self, key: FlowKey) -> FlowRecord {
        let duration = (self.end_time - self.start_time).max(0.0);
        let avg_packet_size = self.total_bytes as f64 / self.packet_count as f64;

        FlowRecord {
            src_ip: key.src_ip,
            dst_ip: key.dst_ip,
            src_port: key.src_port,
            dst_port: key.dst_port,
            protocol: key.protocol,
            packet_count: self.packet_count,
            total_bytes: self.total_bytes,
            start_time: self.start_time,
            end_time: self.end_time,
            duration,
            avg_packet_size,
        }
    }
}

/// One finalized flow summary row
///
/// Emitted once per distinct [`FlowKey`] when aggregation is flushed and
/// never mutated afterwards. `packet_count` is at least 1; flows with
/// zero packets do not exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowRecord {
    pub src_ip: IpAddr,
    pub dst_ip: IpAddr,
    pub src_port: u16,
    pub dst_port: u16,
    pub protocol: TransportProtocol,
    pub packet_count: u64,
    pub total_bytes: u64,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub avg_packet_size: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn make_packet(ts: f64, length: u64) -> PacketDescriptor {
        PacketDescriptor::new(
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100)),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            54321,
            80,
            TransportProtocol::Tcp,
            length,
            ts,
        )
    }

    #[test]
    fn test_key_is_directional() {
        let fwd = make_packet(0.0, 64);
        let mut rev = make_packet(0.0, 64);
        std::mem::swap(&mut rev.src_ip, &mut rev.dst_ip);
        std::mem::swap(&mut rev.src_port, &mut rev.dst_port);

        assert_ne!(FlowKey::from_packet(&fwd), FlowKey::from_packet(&rev));
    }

    #[test]
    fn test_accumulator_invariants() {
        let first = make_packet(100.0, 60);
        let mut acc = FlowAccumulator::new(&first);
        acc.update(&make_packet(101.5, 140));
        acc.update(&make_packet(103.0, 100));

        let record = acc.into_record(FlowKey::from_packet(&first));
        assert_eq!(record.packet_count, 3);
        assert_eq!(record.total_bytes, 300);
        assert_eq!(record.start_time, 100.0);
        assert_eq!(record.end_time, 103.0);
        assert!((record.duration - 3.0).abs() < 1e-9);
        assert!((record.avg_packet_size - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_end_time_is_last_write_not_max() {
        // Out-of-order arrival: the final end_time reflects arrival order.
        let first = make_packet(100.0, 60);
        let mut acc = FlowAccumulator::new(&first);
        acc.update(&make_packet(105.0, 60));
        acc.update(&make_packet(102.0, 60));

        let record = acc.into_record(FlowKey::from_packet(&first));
        assert_eq!(record.end_time, 102.0);
        assert!((record.duration - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_duration_clamped_to_zero() {
        let first = make_packet(100.0, 60);
        let mut acc = FlowAccumulator::new(&first);
        acc.update(&make_packet(90.0, 60));

        let record = acc.into_record(FlowKey::from_packet(&first));
        assert_eq!(record.duration, 0.0);
    }
}
