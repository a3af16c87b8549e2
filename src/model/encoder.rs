//! Label encoder: bijection between class codes and action labels

use crate::error::{FlowsightError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ordered bijection between integer class codes and action labels.
///
/// The class order is fixed by the artifact and determines the row/column
/// order of the confusion matrix and the classification report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    /// Load an encoder from a JSON artifact file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let encoder: Self = serde_json::from_str(&json)?;
        if encoder.classes.is_empty() {
            return Err(FlowsightError::DataError(
                "label encoder artifact has no classes".to_string(),
            ));
        }
        Ok(encoder)
    }

    /// Save the encoder to a JSON artifact file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Forward mapping: label -> class code. Fails on unseen labels.
    pub fn transform(&self, label: &str) -> Result<i64> {
        self.classes
            .iter()
            .position(|c| c == label)
            .map(|i| i as i64)
            .ok_or_else(|| FlowsightError::UnknownLabel(label.to_string()))
    }

    /// Inverse mapping: class code -> label. Fails on out-of-range codes.
    pub fn inverse_transform(&self, code: i64) -> Result<&str> {
        if code < 0 || code as usize >= self.classes.len() {
            return Err(FlowsightError::UnknownClassCode(code));
        }
        Ok(&self.classes[code as usize])
    }

    /// Class names in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
