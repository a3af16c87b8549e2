//! Flowsight - Network flow action dashboard
//!
//! A single-page dashboard over a pre-trained network traffic classifier:
//! dataset preview, summary visualizations, live single-record prediction,
//! and full-dataset evaluation metrics.
//!
//! # Modules
//!
//! - [`schema`] - The shared 11-column feature schema and form defaults
//! - [`model`] - Pre-trained classifier and label encoder artifacts
//! - [`data`] - Dataset loading with in-memory label encoding
//! - [`metrics`] - Confusion matrix and classification report
//! - [`server`] - HTTP server with the embedded dashboard UI and JSON API

// Core error handling
pub mod error;

// Domain
pub mod data;
pub mod metrics;
pub mod model;
pub mod schema;

// Services
pub mod server;

pub use error::{FlowsightError, Result};
