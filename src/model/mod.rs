//! Pre-trained model artifacts: classifier and label encoder
//!
//! Both artifacts are deserialized once at process start and are immutable
//! afterwards. A missing, corrupt, or schema-incompatible artifact is fatal.

mod classifier;
mod encoder;

pub use classifier::{ActionClassifier, TreeNode};
pub use encoder::LabelEncoder;

use crate::error::{FlowsightError, Result};
use crate::schema::FEATURE_COLUMNS;
use std::path::Path;
use tracing::info;

/// Load-once holder for the classifier and the label encoder.
pub struct Artifacts {
    pub classifier: ActionClassifier,
    pub encoder: LabelEncoder,
}

impl Artifacts {
    /// Deserialize both artifacts and cross-check them against the schema.
    pub fn load(model_path: impl AsRef<Path>, encoder_path: impl AsRef<Path>) -> Result<Self> {
        let model_path = model_path.as_ref();
        let encoder_path = encoder_path.as_ref();

        let classifier = ActionClassifier::load(model_path)?;
        info!(
            path = %model_path.display(),
            n_features = classifier.n_features(),
            depth = classifier.depth(),
            "Loaded classifier artifact"
        );

        if classifier.n_features() != FEATURE_COLUMNS.len() {
            return Err(FlowsightError::ShapeMismatch {
                expected: format!("{} features (schema width)", FEATURE_COLUMNS.len()),
                actual: format!("{} features in classifier artifact", classifier.n_features()),
            });
        }

        let encoder = LabelEncoder::load(encoder_path)?;
        info!(
            path = %encoder_path.display(),
            classes = ?encoder.classes(),
            "Loaded label encoder artifact"
        );

        // Every code the classifier can emit must decode to a label.
        for &code in classifier.classes() {
            encoder.inverse_transform(code)?;
        }

        Ok(Self {
            classifier,
            encoder,
        })
    }
}
