//! flowsight — batch network traffic triage
//!
//! A packet batch flows strictly downward through the pipeline:
//!
//! 1. [`flow::aggregate`] groups decoded packets into per-conversation
//!    summary records.
//! 2. [`rules::RuleEngine`] runs independent heuristic detectors over
//!    the flow table and folds their findings into a risk score.
//! 3. [`features::build_features`] derives the numeric feature table.
//! 4. [`ml::align`] reshapes that table to the frozen training schema.
//! 5. [`ml::score`] turns classifier output into per-flow verdicts.
//!
//! The rule findings and the ML verdicts are independent reads of the
//! same flow table; [`analyzer::Analyzer`] combines them into one
//! report at the end.
//!
//! # Example
//!
//! ```ignore
//! use flowsight::{Analyzer, RulesConfig};
//!
//! let analyzer = Analyzer::new(RulesConfig::default());
//! let report = analyzer.analyze(&packets)?;
//! println!("risk: {}", report.rule_based.risk_level);
//! ```

pub mod analyzer;
pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod flow;
pub mod io;
pub mod ml;
pub mod rules;
pub mod synth;

pub use analyzer::{AnalysisReport, Analyzer};
pub use config::Config;
pub use crate::core::{FlowKey, FlowRecord, PacketDescriptor, TransportProtocol};
pub use error::{FlowsightError, Result};
pub use features::{build_features, FeatureTable, FEATURE_COLUMNS};
pub use flow::aggregate;
pub use ml::{align, score, LabelCodec, ScoringContext, TrainingSchema, Verdict};
pub use rules::{Finding, RiskAssessment, RiskLevel, RuleEngine, RulesConfig, Severity};
