//! Application state: immutable artifacts, dataset, and the cached evaluation

use crate::data::FlowDataset;
use crate::error::Result;
use crate::metrics::{confusion_matrix, ClassificationReport};
use crate::model::{ActionClassifier, Artifacts, LabelEncoder};
use serde::Serialize;
use std::sync::OnceLock;
use tracing::info;

use super::ServerConfig;

/// Full-dataset evaluation result. Deterministic for a fixed dataset and
/// classifier, so it is computed once per process and cached.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// Confusion matrix rows (actual) by columns (predicted), encoder order.
    pub matrix: Vec<Vec<u64>>,
    pub class_names: Vec<String>,
    pub report: ClassificationReport,
    pub report_text: String,
}

/// State shared across handlers. Everything here is read-only after startup,
/// so handlers never take a lock.
pub struct AppState {
    pub config: ServerConfig,
    pub classifier: ActionClassifier,
    pub encoder: LabelEncoder,
    pub dataset: FlowDataset,
    evaluation: OnceLock<Evaluation>,
}

impl AppState {
    pub fn new(config: ServerConfig, artifacts: Artifacts, dataset: FlowDataset) -> Self {
        Self {
            config,
            classifier: artifacts.classifier,
            encoder: artifacts.encoder,
            dataset,
            evaluation: OnceLock::new(),
        }
    }

    /// Evaluation over the full dataset, computed lazily on first request.
    pub fn evaluation(&self) -> Result<&Evaluation> {
        if let Some(eval) = self.evaluation.get() {
            return Ok(eval);
        }
        let eval = self.compute_evaluation()?;
        Ok(self.evaluation.get_or_init(|| eval))
    }

    fn compute_evaluation(&self) -> Result<Evaluation> {
        let x = self.dataset.feature_matrix()?;
        let y_true = self.dataset.encoded_labels()?;
        let y_pred = self.classifier.predict(&x)?;

        let matrix = confusion_matrix(&y_true, &y_pred, self.encoder.len())?;
        let report = ClassificationReport::from_confusion_matrix(&matrix, self.encoder.classes())?;
        let report_text = report.to_text();

        info!(
            rows = self.dataset.n_rows(),
            accuracy = report.accuracy,
            "Computed full-dataset evaluation"
        );

        Ok(Evaluation {
            matrix: matrix
                .rows()
                .into_iter()
                .map(|row| row.to_vec())
                .collect(),
            class_names: self.encoder.classes().to_vec(),
            report,
            report_text,
        })
    }
}
