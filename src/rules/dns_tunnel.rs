//! DNS tunnel detector
//!
//! DNS is normally small and bursty; sustained high-volume port 53
//! traffic suggests a covert channel.

use crate::core::FlowRecord;

use super::{Detector, Finding, RulesConfig, Severity};

pub struct DnsTunnelDetector;

impl Detector for DnsTunnelDetector {
    fn id(&self) -> &'static str {
        "FS03_DNS_TUNNEL_LIKE"
    }

    fn evaluate(&self, flows: &[FlowRecord], config: &RulesConfig) -> Option<Finding> {
        if flows.is_empty() {
            return None;
        }

        let dns: Vec<&FlowRecord> = flows
            .iter()
            .filter(|f| f.dst_port == config.dns_port)
            .collect();
        if dns.is_empty() {
            return None;
        }

        let total_packets: u64 = dns.iter().map(|f| f.packet_count).sum();
        let total_bytes: u64 = dns.iter().map(|f| f.total_bytes).sum();

        if total_packets < config.dns_packet_threshold && total_bytes < config.dns_bytes_threshold {
            return None;
        }

        let severity = if total_packets >= config.dns_packet_threshold * 2
            || total_bytes >= config.dns_bytes_threshold * 2
        {
            Severity::High
        } else {
            Severity::Medium
        };

        let message = format!(
            "Observed high-volume DNS traffic: {} packets and {} bytes to port {}; \
             this may be consistent with DNS tunneling or data exfiltration",
            total_packets, total_bytes, config.dns_port
        );

        Some(Finding::new(self.id(), severity, message, dns.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TransportProtocol;
    use std::net::{IpAddr, Ipv4Addr};

    fn dns_flow(packet_count: u64, total_bytes: u64) -> FlowRecord {
        FlowRecord {
            src_ip: IpAddr::V4(Ipv4Addr::new(172, 16, 0, 9)),
            dst_ip: IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
            src_port: 40000,
            dst_port: 53,
            protocol: TransportProtocol::Udp,
            packet_count,
            total_bytes,
            start_time: 0.0,
            end_time: 30.0,
            duration: 30.0,
            avg_packet_size: total_bytes as f64 / packet_count as f64,
        }
    }

    #[test]
    fn test_quiet_dns_is_silent() {
        let flows = vec![dns_flow(50, 4_000), dns_flow(30, 2_500)];
        assert!(DnsTunnelDetector
            .evaluate(&flows, &RulesConfig::default())
            .is_none());
    }

    #[test]
    fn test_packet_volume_fires_medium() {
        let flows = vec![dns_flow(600, 60_000)];
        let finding = DnsTunnelDetector
            .evaluate(&flows, &RulesConfig::default())
            .unwrap();
        assert_eq!(finding.severity, Severity::Medium);
        assert_eq!(finding.flows_affected, 1);
    }

    #[test]
    fn test_double_threshold_escalates_high() {
        let flows = vec![dns_flow(1_200, 80_000)];
        let finding = DnsTunnelDetector
            .evaluate(&flows, &RulesConfig::default())
            .unwrap();
        assert_eq!(finding.severity, Severity::High);
    }

    #[test]
    fn test_byte_volume_alone_fires() {
        let flows = vec![dns_flow(100, 700_000)];
        let finding = DnsTunnelDetector
            .evaluate(&flows, &RulesConfig::default())
            .unwrap();
        assert_eq!(finding.severity, Severity::Medium);
    }

    #[test]
    fn test_non_dns_traffic_ignored() {
        let mut heavy = dns_flow(10_000, 10_000_000);
        heavy.dst_port = 443;
        assert!(DnsTunnelDetector
            .evaluate(&[heavy], &RulesConfig::default())
            .is_none());
    }
}
