//! Port-scan detector
//!
//! One source address touching many distinct destination ports is the
//! classic horizontal scan signature.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;

use crate::core::FlowRecord;

use super::{Detector, Finding, RulesConfig, Severity};

pub struct PortScanDetector;

impl Detector for PortScanDetector {
    fn id(&self) -> &'static str {
        "FS01_PORT_SCAN"
    }

    fn evaluate(&self, flows: &[FlowRecord], config: &RulesConfig) -> Option<Finding> {
        if flows.is_empty() {
            return None;
        }

        let mut ports_by_src: HashMap<IpAddr, HashSet<u16>> = HashMap::new();
        for flow in flows {
            ports_by_src
                .entry(flow.src_ip)
                .or_default()
                .insert(flow.dst_port);
        }

        let offenders: HashSet<IpAddr> = ports_by_src
            .iter()
            .filter(|(_, ports)| ports.len() >= config.scan_port_threshold)
            .map(|(ip, _)| *ip)
            .collect();

        if offenders.is_empty() {
            return None;
        }

        let flows_affected = flows
            .iter()
            .filter(|f| offenders.contains(&f.src_ip))
            .count();

        let message = format!(
            "Detected {} source address(es) reaching >= {} distinct destination ports; \
             this pattern is consistent with a port scan",
            offenders.len(),
            config.scan_port_threshold
        );

        Some(Finding::new(self.id(), Severity::High, message, flows_affected))
    }
}
