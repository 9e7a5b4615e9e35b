use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tabled::{Table, Tabled};

use flowsight::analyzer::{AnalysisReport, Analyzer};
use flowsight::config::Config;
use flowsight::io::{read_packets_jsonl, write_report_json};
use flowsight::ml::storage::artifacts_available;
use flowsight::ml::{train_and_save, ScoringContext};
use flowsight::rules::{RiskAssessment, RiskLevel};
use flowsight::synth::generate_labeled_flows;

#[derive(Parser)]
#[command(name = "flowsight")]
#[command(author, version, about = "Batch traffic triage: flow heuristics plus ML classification")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full analysis pipeline on a packet batch
    Analyze {
        /// Packet descriptors, one JSON object per line
        input: PathBuf,

        /// Model artifact directory (overrides config)
        #[arg(short, long)]
        model_dir: Option<PathBuf>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// Also write the report as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run only the heuristic rule engine
    Rules {
        /// Packet descriptors, one JSON object per line
        input: PathBuf,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Train a model on synthetic flows and save its artifacts
    Train {
        /// Model artifact directory (overrides config)
        #[arg(short, long)]
        model_dir: Option<PathBuf>,

        /// Flows generated per behavior
        #[arg(long)]
        flows_per_behavior: Option<usize>,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Table row for findings
#[derive(Tabled)]
struct FindingRow {
    #[tabled(rename = "Rule")]
    rule: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Flows")]
    flows: usize,
    #[tabled(rename = "Message")]
    message: String,
}

/// Table row for per-label verdict counts
#[derive(Tabled)]
struct LabelCountRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Flows")]
    flows: u64,
}

pub fn run_command(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default()?,
    };

    match cli.command {
        Commands::Analyze {
            input,
            model_dir,
            format,
            output,
        } => {
            let packets = read_packets_jsonl(&input)?;
            let model_dir = model_dir.unwrap_or_else(|| config.model_dir().to_path_buf());

            let mut analyzer = Analyzer::new(config.rules.clone());
            if artifacts_available(&model_dir) {
                let ctx = ScoringContext::load(&model_dir).with_context(|| {
                    format!("Failed to load model artifacts from {}", model_dir.display())
                })?;
                analyzer = analyzer.with_scoring(Arc::new(ctx));
            } else {
                println!(
                    "{} no model artifacts in {}; running rules only",
                    "Note:".yellow().bold(),
                    model_dir.display()
                );
            }

            let report = analyzer.analyze(&packets)?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }

            if let Some(path) = output {
                write_report_json(&path, &report)?;
                println!("Report written to {}", path.display());
            }
        }

        Commands::Rules { input, format } => {
            let packets = read_packets_jsonl(&input)?;
            let analyzer = Analyzer::new(config.rules.clone());
            let flows = flowsight::flow::aggregate(&packets);
            let assessment = analyzer.evaluate_rules(&flows);

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&assessment)?);
            } else {
                println!("Flows: {}", flows.len());
                print_assessment(&assessment);
            }
        }

        Commands::Train {
            model_dir,
            flows_per_behavior,
            seed,
        } => {
            let mut synth = config.synth.clone();
            if let Some(n) = flows_per_behavior {
                synth.flows_per_behavior = n;
            }
            if let Some(s) = seed {
                synth.seed = s;
            }

            let model_dir = model_dir.unwrap_or_else(|| config.model_dir().to_path_buf());
            let (flows, labels) = generate_labeled_flows(&synth);
            let report = train_and_save(&model_dir, &flows, &labels, synth.seed)?;

            println!(
                "{} {} model on {} flows (accuracy {:.1}%)",
                "Trained".green().bold(),
                report.model_name,
                report.num_train_samples + report.num_val_samples,
                report.accuracy * 100.0
            );
            println!("Artifacts saved to {}", model_dir.display());
        }
    }

    Ok(())
}

fn risk_level_colored(level: RiskLevel) -> colored::ColoredString {
    let text = level.to_string();
    match level {
        RiskLevel::None => text.green(),
        RiskLevel::Low => text.yellow(),
        RiskLevel::Medium => text.red(),
        RiskLevel::High => text.red().bold(),
    }
}

fn print_assessment(assessment: &RiskAssessment) {
    println!(
        "Risk: {} (score {})",
        risk_level_colored(assessment.risk_level),
        assessment.risk_score
    );

    if assessment.findings.is_empty() {
        println!("No findings.");
        return;
    }

    let rows: Vec<FindingRow> = assessment
        .findings
        .iter()
        .map(|f| FindingRow {
            rule: f.rule_id.clone(),
            severity: f.severity.to_string(),
            flows: f.flows_affected,
            message: f.message.clone(),
        })
        .collect();
    println!("{}", Table::new(rows));
}

fn print_report(report: &AnalysisReport) {
    println!("Flows: {}", report.num_flows);
    print_assessment(&report.rule_based);

    if report.ml_based.summary.num_flows_scored > 0 {
        println!(
            "\nML verdicts ({} flows scored):",
            report.ml_based.summary.num_flows_scored
        );
        let rows: Vec<LabelCountRow> = report
            .ml_based
            .summary
            .label_counts
            .iter()
            .map(|(label, count)| LabelCountRow {
                label: label.clone(),
                flows: *count,
            })
            .collect();
        println!("{}", Table::new(rows));
    }
}
