//! Classifier trait and the built-in implementation
//!
//! The pipeline only ever talks to [`FlowClassifier`]; swapping the
//! concrete model for something heavier is a local change here.

use serde::{Deserialize, Serialize};

use crate::error::{FlowsightError, Result};

/// Floor applied to per-feature spread so normalization never divides by zero
const STD_FLOOR: f64 = 1e-6;

/// A trained multi-class classifier over aligned feature rows
///
/// Implementations must be reentrant for concurrent reads: prediction
/// takes `&self` and mutates nothing.
pub trait FlowClassifier: Send + Sync {
    /// Model name for logs and artifacts
    fn name(&self) -> &'static str;

    /// Whether the model has been fit
    fn is_trained(&self) -> bool;

    /// Width of the feature rows the model was fit against
    fn n_features(&self) -> usize;

    /// Number of classes the model distinguishes
    fn n_classes(&self) -> usize;

    /// Per-class probabilities for each row, in class-index order.
    ///
    /// Every returned distribution is non-negative and sums to 1 within
    /// floating tolerance. A row of the wrong width is an error, never a
    /// silent default.
    fn predict_proba(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>>;
}

/// Gaussian nearest-centroid classifier
///
/// Fit computes a per-class centroid plus a global per-feature spread;
/// prediction scores a row by its normalized distance to each centroid
/// and softmaxes the negated distances into probabilities. Simple, fast,
/// and deterministic, which is all the synthetic behaviors need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentroidClassifier {
    /// Global per-feature mean
    feature_means: Vec<f64>,
    /// Global per-feature standard deviation (floored)
    feature_stds: Vec<f64>,
    /// Per-class centroid in raw feature space
    class_centroids: Vec<Vec<f64>>,
    /// Whether fit has run
    trained: bool,
}

impl Default for CentroidClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CentroidClassifier {
    /// Create an untrained model
    pub fn new() -> Self {
        Self {
            feature_means: Vec::new(),
            feature_stds: Vec::new(),
            class_centroids: Vec::new(),
            trained: false,
        }
    }

    /// Fit on feature rows with parallel class indices.
    ///
    /// Every class in `0..n_classes` must have at least one sample;
    /// a class with none has no centroid and the fit is rejected.
    pub fn fit(&mut self, rows: &[Vec<f64>], classes: &[usize], n_classes: usize) -> Result<()> {
        if rows.is_empty() || n_classes == 0 {
            return Err(FlowsightError::EmptyTrainingSet);
        }
        if rows.len() != classes.len() {
            return Err(FlowsightError::LabelRowMismatch {
                rows: rows.len(),
                labels: classes.len(),
            });
        }

        let width = rows[0].len();
        for row in rows {
            if row.len() != width {
                return Err(FlowsightError::ShapeMismatch {
                    expected: width,
                    got: row.len(),
                });
            }
        }
        for &class in classes {
            if class >= n_classes {
                return Err(FlowsightError::UnknownClassIndex {
                    index: class,
                    n_classes,
                });
            }
        }

        // Global per-feature mean and spread.
        let n = rows.len() as f64;
        let mut means = vec![0.0; width];
        for row in rows {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut means {
            *m /= n;
        }

        let mut stds = vec![0.0; width];
        for row in rows {
            for ((s, v), m) in stds.iter_mut().zip(row).zip(&means) {
                let diff = v - m;
                *s += diff * diff;
            }
        }
        for s in &mut stds {
            *s = (*s / n).sqrt().max(STD_FLOOR);
        }

        // Per-class centroids.
        let mut centroids = vec![vec![0.0; width]; n_classes];
        let mut counts = vec![0usize; n_classes];
        for (row, &class) in rows.iter().zip(classes) {
            counts[class] += 1;
            for (c, v) in centroids[class].iter_mut().zip(row) {
                *c += v;
            }
        }
        for (class, count) in counts.iter().enumerate() {
            if *count == 0 {
                return Err(FlowsightError::EmptyClass(class));
            }
            for c in &mut centroids[class] {
                *c /= *count as f64;
            }
        }

        self.feature_means = means;
        self.feature_stds = stds;
        self.class_centroids = centroids;
        self.trained = true;
        Ok(())
    }

    /// Normalized squared distance from a row to one class centroid
    fn distance2(&self, row: &[f64], class: usize) -> f64 {
        let centroid = &self.class_centroids[class];
        let mut sum = 0.0;
        for ((v, c), s) in row.iter().zip(centroid).zip(&self.feature_stds) {
            let d = (v - c) / s;
            sum += d * d;
        }
        sum / row.len() as f64
    }
}

impl FlowClassifier for CentroidClassifier {
    fn name(&self) -> &'static str {
        "centroid"
    }

    fn is_trained(&self) -> bool {
        self.trained
    }

    fn n_features(&self) -> usize {
        self.feature_means.len()
    }

    fn n_classes(&self) -> usize {
        self.class_centroids.len()
    }

    fn predict_proba(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        if !self.trained {
            return Err(FlowsightError::NotTrained);
        }

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            if row.len() != self.n_features() {
                return Err(FlowsightError::ShapeMismatch {
                    expected: self.n_features(),
                    got: row.len(),
                });
            }

            // Softmax over negated distances, shifted for stability.
            let scores: Vec<f64> = (0..self.n_classes())
                .map(|class| -self.distance2(row, class))
                .collect();
            let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
            let total: f64 = exps.iter().sum();
            out.push(exps.into_iter().map(|e| e / total).collect());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two well-separated 2D clusters
    fn fitted() -> CentroidClassifier {
        let rows = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.5],
            vec![0.5, 1.0],
            vec![100.0, 100.0],
            vec![101.0, 99.0],
            vec![99.0, 101.0],
        ];
        let classes = vec![0, 0, 0, 1, 1, 1];

        let mut model = CentroidClassifier::new();
        model.fit(&rows, &classes, 2).unwrap();
        model
    }

    #[test]
    fn test_untrained_predict_errors() {
        let model = CentroidClassifier::new();
        assert!(matches!(
            model.predict_proba(&[vec![1.0, 2.0]]),
            Err(FlowsightError::NotTrained)
        ));
    }

    #[test]
    fn test_fit_and_predict_clusters() {
        let model = fitted();
        assert!(model.is_trained());
        assert_eq!(model.n_features(), 2);
        assert_eq!(model.n_classes(), 2);

        let proba = model
            .predict_proba(&[vec![0.2, 0.3], vec![100.5, 100.2]])
            .unwrap();
        assert!(proba[0][0] > proba[0][1]);
        assert!(proba[1][1] > proba[1][0]);
    }

    #[test]
    fn test_probabilities_are_a_distribution() {
        let model = fitted();
        let proba = model.predict_proba(&[vec![37.0, 42.0]]).unwrap();
        let sum: f64 = proba[0].iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(proba[0].iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn test_wrong_width_row_errors() {
        let model = fitted();
        assert!(matches!(
            model.predict_proba(&[vec![1.0, 2.0, 3.0]]),
            Err(FlowsightError::ShapeMismatch { expected: 2, got: 3 })
        ));
    }

    #[test]
    fn test_empty_class_rejected() {
        let rows = vec![vec![0.0], vec![1.0]];
        let classes = vec![0, 0];
        let mut model = CentroidClassifier::new();
        assert!(matches!(
            model.fit(&rows, &classes, 2),
            Err(FlowsightError::EmptyClass(1))
        ));
    }

    #[test]
    fn test_mismatched_labels_rejected() {
        let mut model = CentroidClassifier::new();
        assert!(model.fit(&[vec![0.0]], &[0, 1], 2).is_err());
    }

    #[test]
    fn test_constant_feature_does_not_blow_up() {
        let rows = vec![vec![5.0, 0.0], vec![5.0, 1.0], vec![5.0, 10.0], vec![5.0, 11.0]];
        let classes = vec![0, 0, 1, 1];
        let mut model = CentroidClassifier::new();
        model.fit(&rows, &classes, 2).unwrap();

        let proba = model.predict_proba(&[vec![5.0, 0.5]]).unwrap();
        assert!(proba[0][0] > proba[0][1]);
        assert!(proba[0].iter().all(|p| p.is_finite()));
    }
}
