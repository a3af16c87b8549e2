//! Pre-trained decision tree classifier (inference only)

use crate::error::{FlowsightError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with predicted class code
    Leaf { class: i64, n_samples: usize },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// A pre-trained classifier mapping a numeric feature vector to a class code.
///
/// The tree is fitted offline; this type only deserializes and predicts.
/// It is immutable for the lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionClassifier {
    root: TreeNode,
    n_features: usize,
    classes: Vec<i64>,
}

impl ActionClassifier {
    /// Build a classifier from its parts (used when fitting offline and by tests).
    pub fn from_parts(root: TreeNode, n_features: usize, classes: Vec<i64>) -> Result<Self> {
        let classifier = Self {
            root,
            n_features,
            classes,
        };
        classifier.validate_tree(&classifier.root)?;
        Ok(classifier)
    }

    /// Load a classifier from a JSON artifact file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let classifier: Self = serde_json::from_str(&json)?;
        classifier.validate_tree(&classifier.root)?;
        Ok(classifier)
    }

    /// Save the classifier to a JSON artifact file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Number of features the tree was trained on.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Class codes this classifier can emit.
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Predict a class code for every row of `x`.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<i64>> {
        if x.ncols() != self.n_features {
            return Err(FlowsightError::ShapeMismatch {
                expected: format!("{} feature columns", self.n_features),
                actual: format!("{} feature columns", x.ncols()),
            });
        }

        let predictions: Vec<i64> = (0..x.nrows())
            .map(|i| {
                let row = x.row(i).to_vec();
                Self::predict_sample(&self.root, &row)
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Predict the class code for a single feature row.
    pub fn predict_one(&self, sample: &[f64]) -> Result<i64> {
        if sample.len() != self.n_features {
            return Err(FlowsightError::ShapeMismatch {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", sample.len()),
            });
        }
        Ok(Self::predict_sample(&self.root, sample))
    }

    fn predict_sample(node: &TreeNode, sample: &[f64]) -> i64 {
        match node {
            TreeNode::Leaf { class, .. } => *class,
            TreeNode::Split {
                feature_idx,
                threshold,
                left,
                right,
            } => {
                if sample[*feature_idx] <= *threshold {
                    Self::predict_sample(left, sample)
                } else {
                    Self::predict_sample(right, sample)
                }
            }
        }
    }

    /// Reject artifacts whose split indices fall outside the feature width.
    fn validate_tree(&self, node: &TreeNode) -> Result<()> {
        match node {
            TreeNode::Leaf { .. } => Ok(()),
            TreeNode::Split {
                feature_idx,
                left,
                right,
                ..
            } => {
                if *feature_idx >= self.n_features {
                    return Err(FlowsightError::ShapeMismatch {
                        expected: format!("feature index < {}", self.n_features),
                        actual: format!("feature index {}", feature_idx),
                    });
                }
                self.validate_tree(left)?;
                self.validate_tree(right)
            }
        }
    }

    /// Tree depth (root counts as 1).
    pub fn depth(&self) -> usize {
        Self::node_depth(&self.root)
    }

    fn node_depth(node: &TreeNode) -> usize {
        match node {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => {
                1 + Self::node_depth(left).max(Self::node_depth(right))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn stump() -> ActionClassifier {
        // Single split: feature 0 <= 5.0 -> class 0, else class 1
        let root = TreeNode::Split {
            feature_idx: 0,
            threshold: 5.0,
            left: Box::new(TreeNode::Leaf {
                class: 0,
                n_samples: 3,
            }),
            right: Box::new(TreeNode::Leaf {
                class: 1,
                n_samples: 2,
            }),
        };
        ActionClassifier::from_parts(root, 2, vec![0, 1]).unwrap()
    }

    #[test]
    fn test_predict_simple() {
        let tree = stump();
        let x = array![[1.0, 0.0], [9.0, 0.0], [5.0, 7.0]];
        let preds = tree.predict(&x).unwrap();
        assert_eq!(preds, array![0, 1, 0]);
    }

    #[test]
    fn test_predict_is_deterministic() {
        let tree = stump();
        let x = array![[3.0, 2.0], [8.0, 1.0]];
        let a = tree.predict(&x).unwrap();
        let b = tree.predict(&x).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let tree = stump();
        let x = array![[1.0, 2.0, 3.0]];
        assert!(tree.predict(&x).is_err());
    }

    #[test]
    fn test_save_load_round_trip() {
        let tree = stump();
        let file = tempfile::NamedTempFile::new().unwrap();
        tree.save(file.path()).unwrap();

        let loaded = ActionClassifier::load(file.path()).unwrap();
        assert_eq!(loaded.n_features(), 2);
        assert_eq!(loaded.classes(), &[0, 1]);
        assert_eq!(loaded.predict_one(&[9.0, 0.0]).unwrap(), 1);
    }

    #[test]
    fn test_load_rejects_out_of_range_split() {
        let root = TreeNode::Split {
            feature_idx: 7,
            threshold: 0.0,
            left: Box::new(TreeNode::Leaf {
                class: 0,
                n_samples: 1,
            }),
            right: Box::new(TreeNode::Leaf {
                class: 1,
                n_samples: 1,
            }),
        };
        assert!(ActionClassifier::from_parts(root, 2, vec![0, 1]).is_err());
    }
}
