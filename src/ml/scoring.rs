//! Inference façade
//!
//! Takes an aligned feature table and a trained classifier and packages
//! the outcome per flow. This is where upstream alignment bugs must
//! surface: classifier failures propagate, they are never swallowed
//! into a default verdict.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FlowsightError, Result};
use crate::features::FeatureTable;

use super::labels::LabelCodec;
use super::model::FlowClassifier;

/// Classifier output for one flow row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Most probable label
    pub predicted_label: String,
    /// Probability per label name
    pub probabilities: BTreeMap<String, f64>,
    /// Probability of the predicted label
    pub confidence: f64,
}

/// Score an aligned feature table.
///
/// An empty table short-circuits to an empty verdict list without
/// touching the classifier. The façade never retrains and never mutates
/// the classifier.
pub fn score(
    aligned: &FeatureTable,
    classifier: &dyn FlowClassifier,
    labels: &LabelCodec,
) -> Result<Vec<Verdict>> {
    if aligned.is_empty() {
        return Ok(Vec::new());
    }

    if aligned.num_columns() != classifier.n_features() {
        return Err(FlowsightError::ShapeMismatch {
            expected: classifier.n_features(),
            got: aligned.num_columns(),
        });
    }

    let proba = classifier.predict_proba(aligned.rows())?;
    debug!(
        "Scored {} row(s) with {} model",
        proba.len(),
        classifier.name()
    );

    let mut verdicts = Vec::with_capacity(proba.len());
    for row_proba in proba {
        // Highest-probability class wins.
        let (best_idx, best_p) = row_proba
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(bi, bp), (i, &p)| {
                if p > bp {
                    (i, p)
                } else {
                    (bi, bp)
                }
            });

        let predicted_label = labels
            .decode(best_idx)
            .ok_or(FlowsightError::UnknownClassIndex {
                index: best_idx,
                n_classes: labels.len(),
            })?
            .to_string();

        let mut probabilities = BTreeMap::new();
        for (idx, p) in row_proba.iter().enumerate() {
            let label = labels
                .decode(idx)
                .ok_or(FlowsightError::UnknownClassIndex {
                    index: idx,
                    n_classes: labels.len(),
                })?;
            probabilities.insert(label.to_string(), *p);
        }

        verdicts.push(Verdict {
            predicted_label,
            probabilities,
            confidence: best_p,
        });
    }

    Ok(verdicts)
}
