//! Classification layer
//!
//! Everything between a built feature table and a verdict:
//! - `schema`: the frozen training-time column list and table alignment
//! - `labels`: bijective label name / class index mapping
//! - `model`: the classifier trait and the built-in implementation
//! - `scoring`: the inference façade producing verdicts
//! - `storage`: artifact persistence and process-scoped loading
//! - `training`: fitting a model and freezing its artifacts
//!
//! The classifier itself is a replaceable black box: the rest of the
//! crate only talks to [`FlowClassifier`].

pub mod labels;
pub mod model;
pub mod schema;
pub mod scoring;
pub mod storage;
pub mod training;

pub use labels::LabelCodec;
pub use model::{CentroidClassifier, FlowClassifier};
pub use schema::{align, TrainingSchema};
pub use scoring::{score, Verdict};
pub use storage::{ScoringContext, LABELS_FILE, METADATA_FILE, MODEL_FILE, SCHEMA_FILE};
pub use training::{train, train_and_save, TrainedArtifacts, TrainingReport};
