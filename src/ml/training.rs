//! Model training
//!
//! Fits the built-in classifier on labeled flows and freezes the
//! artifacts a later inference process needs: model parameters, feature
//! schema, label decoder. How the classifier learns is its own business;
//! this module only drives the fit and measures it.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::FlowRecord;
use crate::error::{FlowsightError, Result};
use crate::features::build_features;

use super::labels::LabelCodec;
use super::model::{CentroidClassifier, FlowClassifier};
use super::schema::TrainingSchema;
use super::storage::{save_artifacts, ArtifactMetadata};

/// Fraction of samples held out for the accuracy estimate
const HOLDOUT_DENOMINATOR: usize = 5;

/// Summary of one training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub model_name: String,
    pub trained_at: DateTime<Utc>,
    pub num_train_samples: usize,
    pub num_val_samples: usize,
    pub accuracy: f64,
    pub label_counts: BTreeMap<String, usize>,
}

/// Everything a training run produces
pub struct TrainedArtifacts {
    pub classifier: CentroidClassifier,
    pub schema: TrainingSchema,
    pub labels: LabelCodec,
    pub report: TrainingReport,
}

fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(bi, bp), (i, &p)| {
            if p > bp {
                (i, p)
            } else {
                (bi, bp)
            }
        })
        .0
}

/// Fit a classifier on labeled flows.
///
/// Features are built with the standard pipeline, the label set is
/// frozen into a codec, and a shuffled holdout measures accuracy. When
/// the input is too small for a holdout the estimate falls back to the
/// training set itself.
pub fn train(flows: &[FlowRecord], raw_labels: &[String], seed: u64) -> Result<TrainedArtifacts> {
    if flows.is_empty() {
        return Err(FlowsightError::EmptyTrainingSet);
    }
    if flows.len() != raw_labels.len() {
        return Err(FlowsightError::LabelRowMismatch {
            rows: flows.len(),
            labels: raw_labels.len(),
        });
    }

    let features = build_features(flows);
    let labels = LabelCodec::from_raw(raw_labels.iter().map(|s| s.as_str()));
    let encoded = labels.encode(raw_labels)?;

    let mut indices: Vec<usize> = (0..flows.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let holdout = flows.len() / HOLDOUT_DENOMINATOR;
    let (val_idx, train_idx) = indices.split_at(holdout);

    let select = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<usize>) {
        let rows = idx.iter().map(|&i| features.rows()[i].clone()).collect();
        let classes = idx.iter().map(|&i| encoded[i]).collect();
        (rows, classes)
    };

    let (train_rows, train_classes) = select(train_idx);
    let mut classifier = CentroidClassifier::new();
    classifier.fit(&train_rows, &train_classes, labels.len())?;

    // Accuracy on the holdout, or on the training set when too small.
    let (eval_rows, eval_classes) = if val_idx.is_empty() {
        (train_rows.clone(), train_classes.clone())
    } else {
        select(val_idx)
    };
    let proba = classifier.predict_proba(&eval_rows)?;
    let correct = proba
        .iter()
        .zip(&eval_classes)
        .filter(|(p, &truth)| argmax(p) == truth)
        .count();
    let accuracy = correct as f64 / eval_classes.len() as f64;

    let mut label_counts: BTreeMap<String, usize> = BTreeMap::new();
    for label in raw_labels {
        *label_counts.entry(label.clone()).or_insert(0) += 1;
    }

    info!(
        "Trained {} model: {} train / {} val samples, accuracy {:.3}",
        classifier.name(),
        train_idx.len(),
        val_idx.len(),
        accuracy
    );

    let report = TrainingReport {
        model_name: classifier.name().to_string(),
        trained_at: Utc::now(),
        num_train_samples: train_idx.len(),
        num_val_samples: val_idx.len(),
        accuracy,
        label_counts,
    };

    Ok(TrainedArtifacts {
        schema: TrainingSchema::new(features.columns().to_vec()),
        classifier,
        labels,
        report,
    })
}

/// Train and persist the artifact set to a model directory
pub fn train_and_save<P: AsRef<Path>>(
    dir: P,
    flows: &[FlowRecord],
    raw_labels: &[String],
    seed: u64,
) -> Result<TrainingReport> {
    let artifacts = train(flows, raw_labels, seed)?;

    let metadata = ArtifactMetadata {
        version: 1,
        trained_at: artifacts.report.trained_at,
        model_name: artifacts.report.model_name.clone(),
        num_samples: flows.len(),
        accuracy: artifacts.report.accuracy,
        label_counts: artifacts.report.label_counts.clone(),
    };

    save_artifacts(
        dir,
        &artifacts.classifier,
        &artifacts.schema,
        &artifacts.labels,
        &metadata,
    )?;

    Ok(artifacts.report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{generate_labeled_flows, SynthConfig};

    #[test]
    fn test_train_on_synthetic_behaviors() {
        let config = SynthConfig {
            flows_per_behavior: 60,
            seed: 7,
        };
        let (flows, raw_labels) = generate_labeled_flows(&config);

        let artifacts = train(&flows, &raw_labels, 42).unwrap();
        assert!(artifacts.classifier.is_trained());
        assert_eq!(artifacts.labels.len(), 4);
        assert_eq!(
            artifacts.schema.len(),
            crate::features::FEATURE_COLUMNS.len()
        );
        // The behaviors are far apart; the model should separate them well.
        assert!(artifacts.report.accuracy > 0.8);
    }

    #[test]
    fn test_empty_training_set_rejected() {
        assert!(matches!(
            train(&[], &[], 1),
            Err(FlowsightError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn test_mismatched_labels_rejected() {
        let config = SynthConfig {
            flows_per_behavior: 5,
            seed: 1,
        };
        let (flows, mut raw_labels) = generate_labeled_flows(&config);
        raw_labels.pop();

        assert!(matches!(
            train(&flows, &raw_labels, 1),
            Err(FlowsightError::LabelRowMismatch { .. })
        ));
    }

    #[test]
    fn test_same_seed_same_report() {
        let config = SynthConfig {
            flows_per_behavior: 40,
            seed: 3,
        };
        let (flows, raw_labels) = generate_labeled_flows(&config);

        let a = train(&flows, &raw_labels, 9).unwrap();
        let b = train(&flows, &raw_labels, 9).unwrap();
        assert_eq!(a.report.accuracy, b.report.accuracy);
        assert_eq!(a.report.num_train_samples, b.report.num_train_samples);
    }
}
