//! Error types for the flowsight crate

use thiserror::Error;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum FlowsightError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Unknown action label: '{0}' is not in the encoder's classes")]
    UnknownLabel(String),

    #[error("Unknown class code: {0} is outside the encoder's class range")]
    UnknownClassCode(i64),

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },
}

pub type Result<T> = std::result::Result<T, FlowsightError>;
