use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowsightError {
    #[error("feature shape mismatch: expected {expected} columns, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("unrecognized label value(s): {}", .0.join(", "))]
    UnknownLabels(Vec<String>),

    #[error("classifier has not been trained")]
    NotTrained,

    #[error("class index {index} out of range for {n_classes} known labels")]
    UnknownClassIndex { index: usize, n_classes: usize },

    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("got {rows} feature row(s) but {labels} label(s)")]
    LabelRowMismatch { rows: usize, labels: usize },

    #[error("class {0} has no training samples")]
    EmptyClass(usize),

    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlowsightError>;
