//! Decoded packet descriptors
//!
//! Packets arrive already decoded by an external source (capture tooling,
//! a replay file, a test generator). This module only defines the value
//! types the rest of the pipeline consumes.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Transport-layer protocol of a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportProtocol {
    Tcp,
    Udp,
    Icmp,
    Icmpv6,
    /// Anything else, by IP protocol number
    Other(u8),
}

impl TransportProtocol {
    /// Protocols the flow aggregator knows how to summarize
    pub fn is_recognized(&self) -> bool {
        matches!(self, TransportProtocol::Tcp | TransportProtocol::Udp)
    }
}

impl From<u8> for TransportProtocol {
    fn from(val: u8) -> Self {
        match val {
            1 => TransportProtocol::Icmp,
            6 => TransportProtocol::Tcp,
            17 => TransportProtocol::Udp,
            58 => TransportProtocol::Icmpv6,
            other => TransportProtocol::Other(other),
        }
    }
}

impl std::fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportProtocol::Tcp => write!(f, "TCP"),
            TransportProtocol::Udp => write!(f, "UDP"),
            TransportProtocol::Icmp => write!(f, "ICMP"),
            TransportProtocol::Icmpv6 => write!(f, "ICMPv6"),
            TransportProtocol::Other(n) => write!(f, "Proto({})", n),
        }
    }
}

/// One decoded packet, immutable once produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketDescriptor {
    /// Source address
    pub src_ip: IpAddr,
    /// Destination address
    pub dst_ip: IpAddr,
    /// Source port
    pub src_port: u16,
    /// Destination port
    pub dst_port: u16,
    /// Transport protocol
    pub protocol: TransportProtocol,
    /// Serialized packet length in bytes
    pub length: u64,
    /// Capture timestamp, seconds since the epoch
    pub timestamp: f64,
}

impl PacketDescriptor {
    pub fn new(
        src_ip: IpAddr,
        dst_ip: IpAddr,
        src_port: u16,
        dst_port: u16,
        protocol: TransportProtocol,
        length: u64,
        timestamp: f64,
    ) -> Self {
        Self {
            src_ip,
            dst_ip,
            src_port,
            dst_port,
            protocol,
            length,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_protocol_recognition() {
        assert!(TransportProtocol::Tcp.is_recognized());
        assert!(TransportProtocol::Udp.is_recognized());
        assert!(!TransportProtocol::Icmp.is_recognized());
        assert!(!TransportProtocol::Other(47).is_recognized());
    }

    #[test]
    fn test_protocol_from_number() {
        assert_eq!(TransportProtocol::from(6), TransportProtocol::Tcp);
        assert_eq!(TransportProtocol::from(17), TransportProtocol::Udp);
        assert_eq!(TransportProtocol::from(47), TransportProtocol::Other(47));
    }

    #[test]
    fn test_descriptor_roundtrip() {
        let pkt = PacketDescriptor::new(
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100)),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            54321,
            443,
            TransportProtocol::Tcp,
            64,
            1_700_000_000.5,
        );
        let json = serde_json::to_string(&pkt).unwrap();
        let back: PacketDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back.dst_port, 443);
        assert_eq!(back.protocol, TransportProtocol::Tcp);
    }
}
