//! Artifact persistence and process-scoped scoring state
//!
//! A trained model ships as three JSON artifacts in one directory: the
//! model parameters, the frozen feature schema, and the label decoder.
//! [`ScoringContext`] loads them once at startup into an explicit handle
//! that callers pass around; nothing here is ambient global state, so a
//! process can hold several contexts side by side (useful in tests).

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{FlowsightError, Result};
use crate::features::FeatureTable;

use super::labels::LabelCodec;
use super::model::{CentroidClassifier, FlowClassifier};
use super::schema::{align, TrainingSchema};
use super::scoring::{score, Verdict};

/// Model parameters artifact
pub const MODEL_FILE: &str = "model.json";
/// Frozen feature schema artifact
pub const SCHEMA_FILE: &str = "feature_columns.json";
/// Label decoder artifact
pub const LABELS_FILE: &str = "labels.json";
/// Training run metadata
pub const METADATA_FILE: &str = "metadata.json";

/// Metadata written next to the model artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Storage format version
    pub version: u32,
    /// When training finished
    pub trained_at: DateTime<Utc>,
    /// Model name
    pub model_name: String,
    /// Total samples used
    pub num_samples: usize,
    /// Holdout accuracy
    pub accuracy: f64,
    /// Training samples per label
    pub label_counts: BTreeMap<String, usize>,
}

/// Check whether a directory holds a loadable model
pub fn artifacts_available<P: AsRef<Path>>(dir: P) -> bool {
    let dir = dir.as_ref();
    [MODEL_FILE, SCHEMA_FILE, LABELS_FILE]
        .iter()
        .all(|f| dir.join(f).exists())
}

/// Write the full artifact set for a trained model
pub fn save_artifacts<P: AsRef<Path>>(
    dir: P,
    model: &CentroidClassifier,
    schema: &TrainingSchema,
    labels: &LabelCodec,
    metadata: &ArtifactMetadata,
) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let model_file = File::create(dir.join(MODEL_FILE))?;
    serde_json::to_writer_pretty(BufWriter::new(model_file), model)?;

    schema.save(dir.join(SCHEMA_FILE))?;
    labels.save(dir.join(LABELS_FILE))?;

    let meta_file = File::create(dir.join(METADATA_FILE))?;
    serde_json::to_writer_pretty(BufWriter::new(meta_file), metadata)?;

    info!("Saved model artifacts to {}", dir.display());
    Ok(())
}

/// Read-only scoring state shared for the process lifetime
///
/// Loaded once, then handed by reference to every scoring call. Safe to
/// share across threads: prediction is a pure read.
pub struct ScoringContext {
    classifier: Arc<dyn FlowClassifier>,
    schema: TrainingSchema,
    labels: LabelCodec,
}

impl ScoringContext {
    /// Assemble from parts (tests, alternative classifiers)
    pub fn new(
        classifier: Arc<dyn FlowClassifier>,
        schema: TrainingSchema,
        labels: LabelCodec,
    ) -> Result<Self> {
        if classifier.n_features() != schema.len() {
            return Err(FlowsightError::InvalidArtifact(format!(
                "model expects {} features but schema lists {} columns",
                classifier.n_features(),
                schema.len()
            )));
        }
        if classifier.n_classes() != labels.len() {
            return Err(FlowsightError::InvalidArtifact(format!(
                "model has {} classes but label decoder lists {}",
                classifier.n_classes(),
                labels.len()
            )));
        }
        Ok(Self {
            classifier,
            schema,
            labels,
        })
    }

    /// Load the artifact set from a model directory
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let model_file = File::open(dir.join(MODEL_FILE))?;
        let model: CentroidClassifier = serde_json::from_reader(BufReader::new(model_file))?;
        if !model.is_trained() {
            return Err(FlowsightError::InvalidArtifact(
                "persisted model was never trained".to_string(),
            ));
        }

        let schema = TrainingSchema::load(dir.join(SCHEMA_FILE))?;
        let labels = LabelCodec::load(dir.join(LABELS_FILE))?;

        info!(
            "Loaded {} model from {} ({} features, {} classes)",
            model.name(),
            dir.display(),
            model.n_features(),
            model.n_classes()
        );

        Self::new(Arc::new(model), schema, labels)
    }

    pub fn classifier(&self) -> &dyn FlowClassifier {
        self.classifier.as_ref()
    }

    pub fn schema(&self) -> &TrainingSchema {
        &self.schema
    }

    pub fn labels(&self) -> &LabelCodec {
        &self.labels
    }

    /// Align a freshly built feature table and score it
    pub fn score_features(&self, features: &FeatureTable) -> Result<Vec<Verdict>> {
        let aligned = align(features, &self.schema);
        score(&aligned, self.classifier.as_ref(), &self.labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained_model() -> CentroidClassifier {
        let rows = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![10.0, 10.0], vec![11.0, 11.0]];
        let classes = vec![0, 0, 1, 1];
        let mut model = CentroidClassifier::new();
        model.fit(&rows, &classes, 2).unwrap();
        model
    }

    #[test]
    fn test_artifact_roundtrip() {
        let dir = tempfile::tempdir().unwrap();

        let model = trained_model();
        let schema = TrainingSchema::new(vec!["x".to_string(), "y".to_string()]);
        let labels = LabelCodec::from_raw(["quiet", "loud"]);
        let metadata = ArtifactMetadata {
            version: 1,
            trained_at: Utc::now(),
            model_name: model.name().to_string(),
            num_samples: 4,
            accuracy: 1.0,
            label_counts: BTreeMap::new(),
        };

        assert!(!artifacts_available(dir.path()));
        save_artifacts(dir.path(), &model, &schema, &labels, &metadata).unwrap();
        assert!(artifacts_available(dir.path()));

        let ctx = ScoringContext::load(dir.path()).unwrap();
        assert_eq!(ctx.schema().columns(), &["x", "y"]);
        assert_eq!(ctx.labels().labels(), &["loud", "quiet"]);
        assert_eq!(ctx.classifier().n_features(), 2);
    }

    #[test]
    fn test_mismatched_artifacts_rejected() {
        let model = trained_model();
        let schema = TrainingSchema::new(vec!["x".to_string()]); // model expects 2
        let labels = LabelCodec::from_raw(["quiet", "loud"]);

        let result = ScoringContext::new(Arc::new(model), schema, labels);
        assert!(matches!(result, Err(FlowsightError::InvalidArtifact(_))));
    }

    #[test]
    fn test_score_features_aligns_first() {
        let model = trained_model();
        let schema = TrainingSchema::new(vec!["x".to_string(), "y".to_string()]);
        let labels = LabelCodec::from_raw(["calm", "loud"]);
        let ctx = ScoringContext::new(Arc::new(model), schema, labels).unwrap();

        // Input carries only "y" plus an unrelated column; "x" is filled
        // with 0 and "noise" dropped during alignment.
        let features = FeatureTable::from_rows(
            vec!["y".to_string(), "noise".to_string()],
            vec![vec![0.5, 123.0]],
        )
        .unwrap();

        let verdicts = ctx.score_features(&features).unwrap();
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].predicted_label, "calm");
    }
}
