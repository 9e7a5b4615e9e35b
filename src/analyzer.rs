//! Analysis orchestrator
//!
//! Wires the passes together: packets → flows → (rule findings,
//! features → aligned features → verdicts) → combined report. Rule and
//! ML results are independent reads of the same flow table and only meet
//! here, at the reporting boundary.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{FlowRecord, PacketDescriptor};
use crate::error::Result;
use crate::features::build_features;
use crate::flow::aggregate;
use crate::ml::{ScoringContext, Verdict};
use crate::rules::{RiskAssessment, RuleEngine, RulesConfig};

/// Per-label counts over the scored flows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MlSummary {
    pub num_flows_scored: usize,
    pub label_counts: BTreeMap<String, u64>,
}

/// ML side of a report: per-flow verdicts plus their summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MlReport {
    pub summary: MlSummary,
    pub per_flow: Vec<Verdict>,
}

impl MlReport {
    fn from_verdicts(per_flow: Vec<Verdict>) -> Self {
        let mut label_counts: BTreeMap<String, u64> = BTreeMap::new();
        for verdict in &per_flow {
            *label_counts
                .entry(verdict.predicted_label.clone())
                .or_insert(0) += 1;
        }

        Self {
            summary: MlSummary {
                num_flows_scored: per_flow.len(),
                label_counts,
            },
            per_flow,
        }
    }
}

/// Combined result of one batch analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub num_flows: usize,
    pub rule_based: RiskAssessment,
    pub ml_based: MlReport,
}

/// Batch analyzer
///
/// Holds a configured rule engine and, optionally, a scoring context.
/// Each `analyze` call builds fresh intermediate tables; concurrent
/// calls share nothing mutable, only the read-only context.
pub struct Analyzer {
    engine: RuleEngine,
    scoring: Option<Arc<ScoringContext>>,
}

impl Analyzer {
    /// Analyzer without ML scoring
    pub fn new(rules: RulesConfig) -> Self {
        Self {
            engine: RuleEngine::new(rules),
            scoring: None,
        }
    }

    /// Attach a loaded scoring context
    pub fn with_scoring(mut self, scoring: Arc<ScoringContext>) -> Self {
        self.scoring = Some(scoring);
        self
    }

    /// Whether ML scoring is attached
    pub fn has_scoring(&self) -> bool {
        self.scoring.is_some()
    }

    /// Run the rule engine alone over pre-aggregated flows
    pub fn evaluate_rules(&self, flows: &[FlowRecord]) -> RiskAssessment {
        self.engine.evaluate(flows)
    }

    /// Full pipeline over one packet batch.
    ///
    /// Rule evaluation always runs. ML scoring runs when a context is
    /// attached and the batch produced flows; scoring failures propagate
    /// rather than degrade into an empty verdict list.
    pub fn analyze(&self, packets: &[PacketDescriptor]) -> Result<AnalysisReport> {
        let flows = aggregate(packets);
        info!("Analyzing batch: {} packets, {} flows", packets.len(), flows.len());

        let rule_based = self.engine.evaluate(&flows);

        let features = build_features(&flows);
        let ml_based = match &self.scoring {
            Some(ctx) if !features.is_empty() => {
                let per_flow = ctx.score_features(&features)?;
                MlReport::from_verdicts(per_flow)
            }
            Some(_) => {
                debug!("No flows to score; skipping classifier");
                MlReport::default()
            }
            None => MlReport::default(),
        };

        Ok(AnalysisReport {
            num_flows: flows.len(),
            rule_based,
            ml_based,
        })
    }
}
