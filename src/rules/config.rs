//! Configuration for the heuristic rule engine

use serde::{Deserialize, Serialize};

use super::RiskLevel;

/// Thresholds and knobs for the built-in detectors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Distinct destination ports per source before the scan detector fires
    #[serde(default = "default_scan_port_threshold")]
    pub scan_port_threshold: usize,

    /// Destination ports treated as sensitive admin services
    #[serde(default = "default_sensitive_ports")]
    pub sensitive_ports: Vec<u16>,

    /// Flow count gate for the bruteforce detector
    #[serde(default = "default_brute_flow_threshold")]
    pub brute_flow_threshold: usize,

    /// Packet count gate for the bruteforce detector
    #[serde(default = "default_brute_packet_threshold")]
    pub brute_packet_threshold: u64,

    /// DNS destination port
    #[serde(default = "default_dns_port")]
    pub dns_port: u16,

    /// Packet sum gate for the DNS tunnel detector
    #[serde(default = "default_dns_packet_threshold")]
    pub dns_packet_threshold: u64,

    /// Byte sum gate for the DNS tunnel detector
    #[serde(default = "default_dns_bytes_threshold")]
    pub dns_bytes_threshold: u64,

    /// Risk score bucketing
    #[serde(default)]
    pub risk_levels: RiskLevelThresholds,
}

fn default_scan_port_threshold() -> usize {
    50
}

fn default_sensitive_ports() -> Vec<u16> {
    vec![
        22,   // SSH
        3389, // RDP
        445,  // SMB/CIFS
        139,  // NetBIOS Session
    ]
}

fn default_brute_flow_threshold() -> usize {
    30
}

fn default_brute_packet_threshold() -> u64 {
    1000
}

fn default_dns_port() -> u16 {
    53
}

fn default_dns_packet_threshold() -> u64 {
    500
}

fn default_dns_bytes_threshold() -> u64 {
    500_000
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            scan_port_threshold: default_scan_port_threshold(),
            sensitive_ports: default_sensitive_ports(),
            brute_flow_threshold: default_brute_flow_threshold(),
            brute_packet_threshold: default_brute_packet_threshold(),
            dns_port: default_dns_port(),
            dns_packet_threshold: default_dns_packet_threshold(),
            dns_bytes_threshold: default_dns_bytes_threshold(),
            risk_levels: RiskLevelThresholds::default(),
        }
    }
}

/// Breakpoints mapping a risk score to a risk level
///
/// Must stay monotone: `low_max <= medium_max`. A score of zero always
/// maps to the lowest level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskLevelThresholds {
    /// Highest score still labeled "low"
    #[serde(default = "default_low_max")]
    pub low_max: u32,

    /// Highest score still labeled "medium"
    #[serde(default = "default_medium_max")]
    pub medium_max: u32,
}

fn default_low_max() -> u32 {
    3
}

fn default_medium_max() -> u32 {
    7
}

impl Default for RiskLevelThresholds {
    fn default() -> Self {
        Self {
            low_max: default_low_max(),
            medium_max: default_medium_max(),
        }
    }
}

impl RiskLevelThresholds {
    /// Bucket a score into a level
    pub fn level_for(&self, score: u32) -> RiskLevel {
        debug_assert!(self.low_max <= self.medium_max);

        if score == 0 {
            RiskLevel::None
        } else if score <= self.low_max {
            RiskLevel::Low
        } else if score <= self.medium_max {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = RulesConfig::default();
        assert_eq!(config.scan_port_threshold, 50);
        assert_eq!(config.brute_flow_threshold, 30);
        assert_eq!(config.dns_bytes_threshold, 500_000);
        assert!(config.sensitive_ports.contains(&22));
        assert!(config.sensitive_ports.contains(&3389));
    }

    #[test]
    fn test_level_buckets() {
        let levels = RiskLevelThresholds::default();
        assert_eq!(levels.level_for(0), RiskLevel::None);
        assert_eq!(levels.level_for(1), RiskLevel::Low);
        assert_eq!(levels.level_for(3), RiskLevel::Low);
        assert_eq!(levels.level_for(4), RiskLevel::Medium);
        assert_eq!(levels.level_for(7), RiskLevel::Medium);
        assert_eq!(levels.level_for(8), RiskLevel::High);
    }

    #[test]
    fn test_level_is_monotone() {
        let levels = RiskLevelThresholds::default();
        let mut prev = levels.level_for(0);
        for score in 1..=20 {
            let next = levels.level_for(score);
            assert!(next >= prev);
            prev = next;
        }
    }
}
