//! Bruteforce detector
//!
//! Volume of traffic against sensitive admin services (SSH, RDP, SMB).

use crate::core::FlowRecord;

use super::{Detector, Finding, RulesConfig, Severity};

pub struct BruteForceDetector;

impl Detector for BruteForceDetector {
    fn id(&self) -> &'static str {
        "FS02_BRUTEFORCE_LIKE"
    }

    fn evaluate(&self, flows: &[FlowRecord], config: &RulesConfig) -> Option<Finding> {
        if flows.is_empty() {
            return None;
        }

        let sensitive: Vec<&FlowRecord> = flows
            .iter()
            .filter(|f| config.sensitive_ports.contains(&f.dst_port))
            .collect();
        if sensitive.is_empty() {
            return None;
        }

        let total_flows = sensitive.len();
        let total_packets: u64 = sensitive.iter().map(|f| f.packet_count).sum();

        if total_flows < config.brute_flow_threshold
            && total_packets < config.brute_packet_threshold
        {
            return None;
        }

        // Gate and escalation use the same thresholds, so any emitted
        // finding is high; the medium branch only becomes reachable when
        // the two are configured apart.
        let severity = if total_flows >= config.brute_flow_threshold
            || total_packets >= config.brute_packet_threshold
        {
            Severity::High
        } else {
            Severity::Medium
        };

        let message = format!(
            "Observed {} flow(s) and {} packet(s) targeting admin ports {:?}; \
             this may represent brute-force or authentication-spray activity",
            total_flows, total_packets, config.sensitive_ports
        );

        Some(Finding::new(self.id(), severity, message, total_flows))
    }
}
