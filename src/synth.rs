//! Synthetic labeled flow generation
//!
//! Produces flow records for a handful of traffic behaviors so a model
//! can be trained without real captures in the repository. The patterns
//! only need to be separable, not realistic.

use std::net::{IpAddr, Ipv4Addr};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::core::{FlowRecord, TransportProtocol};

/// Traffic behaviors the generator can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrafficBehavior {
    /// Normal web/DNS traffic
    Benign,
    /// Many short flows to many ports
    PortScan,
    /// Intense traffic to admin ports
    BruteForce,
    /// Heavy DNS flows
    DnsTunnel,
}

impl TrafficBehavior {
    /// All behaviors, in generation order
    pub const ALL: [TrafficBehavior; 4] = [
        TrafficBehavior::Benign,
        TrafficBehavior::PortScan,
        TrafficBehavior::BruteForce,
        TrafficBehavior::DnsTunnel,
    ];

    /// Training label for this behavior
    pub fn label(&self) -> &'static str {
        match self {
            TrafficBehavior::Benign => "benign",
            TrafficBehavior::PortScan => "port_scan",
            TrafficBehavior::BruteForce => "bruteforce",
            TrafficBehavior::DnsTunnel => "dns_tunnel",
        }
    }
}

impl std::fmt::Display for TrafficBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Flows generated per behavior
    #[serde(default = "default_flows_per_behavior")]
    pub flows_per_behavior: usize,

    /// RNG seed for reproducible data sets
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_flows_per_behavior() -> usize {
    500
}

fn default_seed() -> u64 {
    42
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            flows_per_behavior: default_flows_per_behavior(),
            seed: default_seed(),
        }
    }
}

fn random_ip(rng: &mut StdRng) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(
        10,
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
        rng.gen_range(1..=254),
    ))
}

fn pick(rng: &mut StdRng, choices: &[u16]) -> u16 {
    choices[rng.gen_range(0..choices.len())]
}

/// Generate one flow of the given behavior
pub fn generate_flow(behavior: TrafficBehavior, rng: &mut StdRng, base_time: f64) -> FlowRecord {
    let (dst_port, protocol, packet_count, total_bytes, duration) = match behavior {
        TrafficBehavior::Benign => (
            pick(rng, &[80, 443, 8080, 53]),
            if rng.gen_bool(0.5) {
                TransportProtocol::Tcp
            } else {
                TransportProtocol::Udp
            },
            rng.gen_range(5..=50u64),
            rng.gen_range(1_000..=50_000u64),
            rng.gen_range(0.5..10.0),
        ),
        TrafficBehavior::PortScan => (
            rng.gen_range(1..=1024),
            TransportProtocol::Tcp,
            rng.gen_range(1..=3u64),
            rng.gen_range(60..=600u64),
            rng.gen_range(0.01..0.5),
        ),
        TrafficBehavior::BruteForce => (
            pick(rng, &[22, 3389, 445]),
            TransportProtocol::Tcp,
            rng.gen_range(20..=200u64),
            rng.gen_range(10_000..=300_000u64),
            rng.gen_range(2.0..60.0),
        ),
        TrafficBehavior::DnsTunnel => (
            53,
            TransportProtocol::Udp,
            rng.gen_range(50..=800u64),
            rng.gen_range(100_000..=2_000_000u64),
            rng.gen_range(5.0..120.0),
        ),
    };

    let start_time = base_time + rng.gen_range(-3600.0..0.0);
    let end_time = start_time + duration;

    FlowRecord {
        src_ip: random_ip(rng),
        dst_ip: random_ip(rng),
        src_port: rng.gen_range(1024..=65535),
        dst_port,
        protocol,
        packet_count,
        total_bytes,
        start_time,
        end_time,
        duration,
        avg_packet_size: total_bytes as f64 / packet_count as f64,
    }
}

/// Generate flows for every behavior, with labels running in parallel
pub fn generate_labeled_flows(config: &SynthConfig) -> (Vec<FlowRecord>, Vec<String>) {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let base_time = 1_700_000_000.0;

    let mut flows = Vec::with_capacity(config.flows_per_behavior * TrafficBehavior::ALL.len());
    let mut labels = Vec::with_capacity(flows.capacity());

    for behavior in TrafficBehavior::ALL {
        for _ in 0..config.flows_per_behavior {
            flows.push(generate_flow(behavior, &mut rng, base_time));
            labels.push(behavior.label().to_string());
        }
    }

    (flows, labels)
}
