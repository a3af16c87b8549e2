//! Model evaluation metrics: confusion matrix and classification report

use crate::error::{FlowsightError, Result};
use ndarray::{Array1, Array2};
use serde::Serialize;

/// Cross-tabulation of true vs predicted class codes.
///
/// Cell (i, j) counts records with true code i predicted as j. Row and
/// column order follow the label encoder's class order.
pub fn confusion_matrix(
    y_true: &Array1<i64>,
    y_pred: &Array1<i64>,
    n_classes: usize,
) -> Result<Array2<u64>> {
    if y_true.len() != y_pred.len() {
        return Err(FlowsightError::ShapeMismatch {
            expected: format!("{} predictions", y_true.len()),
            actual: format!("{} predictions", y_pred.len()),
        });
    }

    let mut matrix = Array2::zeros((n_classes, n_classes));
    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        if t < 0 || t as usize >= n_classes {
            return Err(FlowsightError::UnknownClassCode(t));
        }
        if p < 0 || p as usize >= n_classes {
            return Err(FlowsightError::UnknownClassCode(p));
        }
        matrix[[t as usize, p as usize]] += 1;
    }
    Ok(matrix)
}

/// Per-class precision/recall/F1/support
#[derive(Debug, Clone, Serialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: u64,
}

/// Averaged metrics row (macro or weighted)
#[derive(Debug, Clone, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: u64,
}

/// Per-class precision/recall/F1/support summary over the full dataset.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    pub per_class: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub total_support: u64,
}

impl ClassificationReport {
    /// Derive the report from a confusion matrix and the class names in
    /// encoder order. Undefined ratios (zero denominators) report as 0.
    pub fn from_confusion_matrix(matrix: &Array2<u64>, class_names: &[String]) -> Result<Self> {
        let n = class_names.len();
        if matrix.shape() != [n, n] {
            return Err(FlowsightError::ShapeMismatch {
                expected: format!("{0}x{0} matrix", n),
                actual: format!("{}x{} matrix", matrix.nrows(), matrix.ncols()),
            });
        }

        let total: u64 = matrix.iter().sum();
        let correct: u64 = (0..n).map(|i| matrix[[i, i]]).sum();

        let mut per_class = Vec::with_capacity(n);
        for (i, label) in class_names.iter().enumerate() {
            let tp = matrix[[i, i]];
            let support: u64 = (0..n).map(|j| matrix[[i, j]]).sum();
            let predicted: u64 = (0..n).map(|j| matrix[[j, i]]).sum();

            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            let f1_score = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            per_class.push(ClassMetrics {
                label: label.clone(),
                precision,
                recall,
                f1_score,
                support,
            });
        }

        let macro_avg = AverageMetrics {
            precision: mean(per_class.iter().map(|c| c.precision)),
            recall: mean(per_class.iter().map(|c| c.recall)),
            f1_score: mean(per_class.iter().map(|c| c.f1_score)),
            support: total,
        };

        let weighted_avg = AverageMetrics {
            precision: weighted(per_class.iter().map(|c| (c.precision, c.support)), total),
            recall: weighted(per_class.iter().map(|c| (c.recall, c.support)), total),
            f1_score: weighted(per_class.iter().map(|c| (c.f1_score, c.support)), total),
            support: total,
        };

        Ok(Self {
            per_class,
            accuracy: ratio(correct, total),
            macro_avg,
            weighted_avg,
            total_support: total,
        })
    }

    /// Plain-text rendering in the familiar tabular layout.
    pub fn to_text(&self) -> String {
        let name_width = self
            .per_class
            .iter()
            .map(|c| c.label.len())
            .chain(["weighted avg".len()].into_iter())
            .max()
            .unwrap_or(12);

        let mut out = String::new();
        out.push_str(&format!(
            "{:>name_width$}  {:>9}  {:>9}  {:>9}  {:>9}\n\n",
            "", "precision", "recall", "f1-score", "support"
        ));

        for c in &self.per_class {
            out.push_str(&format!(
                "{:>name_width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}\n",
                c.label, c.precision, c.recall, c.f1_score, c.support
            ));
        }

        out.push('\n');
        out.push_str(&format!(
            "{:>name_width$}  {:>9}  {:>9}  {:>9.2}  {:>9}\n",
            "accuracy", "", "", self.accuracy, self.total_support
        ));
        out.push_str(&format!(
            "{:>name_width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}\n",
            "macro avg",
            self.macro_avg.precision,
            self.macro_avg.recall,
            self.macro_avg.f1_score,
            self.macro_avg.support
        ));
        out.push_str(&format!(
            "{:>name_width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}\n",
            "weighted avg",
            self.weighted_avg.precision,
            self.weighted_avg.recall,
            self.weighted_avg.f1_score,
            self.weighted_avg.support
        ));

        out
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64
    } else {
        0.0
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn weighted(values: impl Iterator<Item = (f64, u64)>, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    values.map(|(v, w)| v * w as f64).sum::<f64>() / total as f64
}
