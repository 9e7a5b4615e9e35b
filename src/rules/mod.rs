//! Heuristic rule engine
//!
//! Detectors are pure functions over the flow table; each either fires
//! one finding or stays silent. The engine runs every registered
//! detector, sums severity weights into a risk score, and buckets the
//! score into a risk level. Detector thresholds are configuration, not
//! hard-coded law; see [`RulesConfig`].

pub mod config;

mod brute_force;
mod dns_tunnel;
mod port_scan;

pub use brute_force::BruteForceDetector;
pub use config::{RiskLevelThresholds, RulesConfig};
pub use dns_tunnel::DnsTunnelDetector;
pub use port_scan::PortScanDetector;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::FlowRecord;

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Contribution to the overall risk score
    pub fn weight(&self) -> u32 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// One positive detection result, immutable once created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Which detector fired
    pub rule_id: String,
    pub severity: Severity,
    /// Human-readable explanation
    pub message: String,
    /// Flow rows contributing to this finding
    pub flows_affected: usize,
}

impl Finding {
    pub fn new(rule_id: &str, severity: Severity, message: String, flows_affected: usize) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            severity,
            message,
            flows_affected,
        }
    }
}

/// Bucketed risk label, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::None => write!(f, "none"),
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// Combined outcome of one rule-engine pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub num_findings: usize,
    pub findings: Vec<Finding>,
}

/// A heuristic detector over the flow table
///
/// Detectors are independent of one another and must stay pure: same
/// flows and config, same result. Input the detector cannot apply to
/// (empty table, no matching rows) yields `None`, never an error.
pub trait Detector: Send + Sync {
    /// Stable identifier stamped on emitted findings
    fn id(&self) -> &'static str;

    /// Evaluate the table, emitting at most one finding
    fn evaluate(&self, flows: &[FlowRecord], config: &RulesConfig) -> Option<Finding>;
}

/// Ordered set of detectors to run
pub struct RuleRegistry {
    detectors: Vec<Box<dyn Detector>>,
}

impl RuleRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// Registry with the built-in detectors
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(PortScanDetector));
        registry.register(Box::new(BruteForceDetector));
        registry.register(Box::new(DnsTunnelDetector));
        registry
    }

    /// Add a detector
    pub fn register(&mut self, detector: Box<dyn Detector>) {
        self.detectors.push(detector);
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Run every detector, collecting non-empty results in registration order
    pub fn evaluate_all(&self, flows: &[FlowRecord], config: &RulesConfig) -> Vec<Finding> {
        self.detectors
            .iter()
            .filter_map(|d| {
                let finding = d.evaluate(flows, config);
                if finding.is_none() {
                    debug!("Detector {} did not fire", d.id());
                }
                finding
            })
            .collect()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Rule engine: detectors plus score aggregation
pub struct RuleEngine {
    config: RulesConfig,
    registry: RuleRegistry,
}

impl RuleEngine {
    /// Engine with the built-in detectors
    pub fn new(config: RulesConfig) -> Self {
        Self {
            config,
            registry: RuleRegistry::with_builtins(),
        }
    }

    /// Engine with a custom detector set
    pub fn with_registry(config: RulesConfig, registry: RuleRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    /// Evaluate all detectors and aggregate their findings
    pub fn evaluate(&self, flows: &[FlowRecord]) -> RiskAssessment {
        let findings = self.registry.evaluate_all(flows, &self.config);
        let risk_score: u32 = findings.iter().map(|f| f.severity.weight()).sum();
        let risk_level = self.config.risk_levels.level_for(risk_score);

        if !findings.is_empty() {
            info!(
                "Rule engine: {} finding(s), score={}, level={}",
                findings.len(),
                risk_score,
                risk_level
            );
        }

        RiskAssessment {
            risk_score,
            risk_level,
            num_findings: findings.len(),
            findings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TransportProtocol;
    use std::net::{IpAddr, Ipv4Addr};

    fn make_flow(
        src: [u8; 4],
        dst_port: u16,
        protocol: TransportProtocol,
        packet_count: u64,
        total_bytes: u64,
        duration: f64,
    ) -> FlowRecord {
        FlowRecord {
            src_ip: IpAddr::V4(Ipv4Addr::from(src)),
            dst_ip: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            src_port: 40000,
            dst_port,
            protocol,
            packet_count,
            total_bytes,
            start_time: 0.0,
            end_time: duration,
            duration,
            avg_packet_size: total_bytes as f64 / packet_count as f64,
        }
    }

    #[test]
    fn test_severity_weights() {
        assert_eq!(Severity::Low.weight(), 1);
        assert_eq!(Severity::Medium.weight(), 2);
        assert_eq!(Severity::High.weight(), 3);
        assert_eq!(Severity::Critical.weight(), 4);
    }

    #[test]
    fn test_empty_table_scores_zero() {
        let engine = RuleEngine::new(RulesConfig::default());
        let assessment = engine.evaluate(&[]);
        assert_eq!(assessment.risk_score, 0);
        assert_eq!(assessment.risk_level, RiskLevel::None);
        assert!(assessment.findings.is_empty());
    }

    #[test]
    fn test_benign_traffic_scores_zero() {
        let flows = vec![
            make_flow([192, 168, 1, 10], 443, TransportProtocol::Tcp, 40, 30_000, 5.0),
            make_flow([192, 168, 1, 11], 80, TransportProtocol::Tcp, 12, 9_000, 2.0),
        ];
        let engine = RuleEngine::new(RulesConfig::default());
        let assessment = engine.evaluate(&flows);
        assert_eq!(assessment.risk_score, 0);
        assert_eq!(assessment.risk_level, RiskLevel::None);
    }

    #[test]
    fn test_score_is_sum_of_weights() {
        struct FixedDetector(Severity);
        impl Detector for FixedDetector {
            fn id(&self) -> &'static str {
                "TEST_FIXED"
            }
            fn evaluate(&self, _: &[FlowRecord], _: &RulesConfig) -> Option<Finding> {
                Some(Finding::new(self.id(), self.0, "fires always".into(), 1))
            }
        }

        let mut registry = RuleRegistry::new();
        registry.register(Box::new(FixedDetector(Severity::High)));
        registry.register(Box::new(FixedDetector(Severity::Medium)));
        registry.register(Box::new(FixedDetector(Severity::Critical)));

        let engine = RuleEngine::with_registry(RulesConfig::default(), registry);
        let assessment = engine.evaluate(&[]);
        assert_eq!(assessment.risk_score, 3 + 2 + 4);
        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert_eq!(assessment.num_findings, 3);
    }
}
