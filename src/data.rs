//! Dataset loading and read-only accessors
//!
//! The dataset is loaded once at startup and never mutated afterwards. The
//! only in-memory augmentation is the derived `Action_encoded` column, which
//! is resolved exactly once at load time and never written back to disk.

use crate::error::{FlowsightError, Result};
use crate::model::LabelEncoder;
use crate::schema::{ACTION_COLUMN, ENCODED_COLUMN, FEATURE_COLUMNS};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Where the encoded label column came from, resolved once at load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodedProvenance {
    /// The CSV already carried an `Action_encoded` column.
    FromFile,
    /// Derived in memory by applying the encoder to the `Action` column.
    Derived,
}

/// One point of the Bytes-vs-Packets scatter plot.
#[derive(Debug, Clone, Serialize)]
pub struct ScatterPoint {
    pub bytes: f64,
    pub packets: f64,
    pub action: String,
}

/// The loaded flow dataset, read-only for the dashboard's lifetime.
#[derive(Debug)]
pub struct FlowDataset {
    df: DataFrame,
    provenance: EncodedProvenance,
}

impl FlowDataset {
    /// Read the CSV, check the required columns, and resolve the encoded
    /// label column. An `Action` value unseen by the encoder aborts the load.
    pub fn load(path: impl AsRef<Path>, encoder: &LabelEncoder) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| FlowsightError::DataError(format!("{}: {}", path.display(), e)))?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(100))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| FlowsightError::DataError(e.to_string()))?;

        for col in FEATURE_COLUMNS.iter().chain([ACTION_COLUMN].iter()) {
            if df.column(col).is_err() {
                return Err(FlowsightError::ColumnNotFound(col.to_string()));
            }
        }

        let (df, provenance) = if df.column(ENCODED_COLUMN).is_ok() {
            (df, EncodedProvenance::FromFile)
        } else {
            let df = Self::derive_encoded_column(df, encoder)?;
            (df, EncodedProvenance::Derived)
        };

        info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            provenance = ?provenance,
            "Loaded flow dataset"
        );

        Ok(Self { df, provenance })
    }

    fn derive_encoded_column(df: DataFrame, encoder: &LabelEncoder) -> Result<DataFrame> {
        let actions = df
            .column(ACTION_COLUMN)
            .map_err(|_| FlowsightError::ColumnNotFound(ACTION_COLUMN.to_string()))?
            .str()
            .map_err(|e| FlowsightError::DataError(e.to_string()))?
            .clone();

        let mut codes: Vec<i64> = Vec::with_capacity(actions.len());
        for (i, value) in actions.into_iter().enumerate() {
            let label = value.ok_or_else(|| {
                FlowsightError::DataError(format!("null Action value at row {}", i))
            })?;
            codes.push(encoder.transform(label)?);
        }

        let encoded = Series::new(ENCODED_COLUMN.into(), codes);
        let mut df = df;
        df.with_column(encoded)
            .map_err(|e| FlowsightError::DataError(e.to_string()))?;
        Ok(df)
    }

    /// The underlying DataFrame (read-only).
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn provenance(&self) -> EncodedProvenance {
        self.provenance
    }

    pub fn n_rows(&self) -> usize {
        self.df.height()
    }

    /// First `n` rows, verbatim.
    pub fn head(&self, n: usize) -> DataFrame {
        self.df.head(Some(n))
    }

    /// Record counts grouped by `Action`, ordered by descending frequency.
    /// Ties break on the label so the order is deterministic.
    pub fn action_counts(&self) -> Result<Vec<(String, u64)>> {
        let actions = self
            .df
            .column(ACTION_COLUMN)
            .map_err(|_| FlowsightError::ColumnNotFound(ACTION_COLUMN.to_string()))?
            .str()
            .map_err(|e| FlowsightError::DataError(e.to_string()))?
            .clone();

        let mut counts: HashMap<String, u64> = HashMap::new();
        for value in actions.into_iter().flatten() {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }

        let mut counts: Vec<(String, u64)> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(counts)
    }

    /// Full-dataset Bytes-vs-Packets points keyed by `Action`.
    pub fn scatter_points(&self) -> Result<Vec<ScatterPoint>> {
        let bytes = self.numeric_column("Bytes")?;
        let packets = self.numeric_column("Packets")?;
        let actions = self
            .df
            .column(ACTION_COLUMN)
            .map_err(|_| FlowsightError::ColumnNotFound(ACTION_COLUMN.to_string()))?
            .str()
            .map_err(|e| FlowsightError::DataError(e.to_string()))?
            .clone();

        let points = actions
            .into_iter()
            .zip(bytes.iter().zip(packets.iter()))
            .map(|(action, (&b, &p))| ScatterPoint {
                bytes: b,
                packets: p,
                action: action.unwrap_or_default().to_string(),
            })
            .collect();
        Ok(points)
    }

    /// The full feature matrix, columns ordered per the shared schema.
    pub fn feature_matrix(&self) -> Result<Array2<f64>> {
        let n_rows = self.df.height();
        let mut x = Array2::zeros((n_rows, FEATURE_COLUMNS.len()));

        for (j, col_name) in FEATURE_COLUMNS.iter().enumerate() {
            let values = self.numeric_column(col_name)?;
            for (i, &v) in values.iter().enumerate() {
                x[[i, j]] = v;
            }
        }

        Ok(x)
    }

    /// True encoded labels, one per row.
    pub fn encoded_labels(&self) -> Result<Array1<i64>> {
        let column = self
            .df
            .column(ENCODED_COLUMN)
            .map_err(|_| FlowsightError::ColumnNotFound(ENCODED_COLUMN.to_string()))?;

        let casted = column
            .cast(&DataType::Int64)
            .map_err(|e| FlowsightError::DataError(e.to_string()))?;
        let ca = casted
            .i64()
            .map_err(|e| FlowsightError::DataError(e.to_string()))?;

        let mut labels = Vec::with_capacity(ca.len());
        for (i, value) in ca.into_iter().enumerate() {
            labels.push(value.ok_or_else(|| {
                FlowsightError::DataError(format!("null {} value at row {}", ENCODED_COLUMN, i))
            })?);
        }
        Ok(Array1::from_vec(labels))
    }

    /// Extract a feature column as f64, failing on non-numeric or null cells.
    fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let column = self
            .df
            .column(name)
            .map_err(|_| FlowsightError::ColumnNotFound(name.to_string()))?;

        let casted = column.cast(&DataType::Float64).map_err(|_| {
            FlowsightError::DataError(format!("column '{}' is not numeric", name))
        })?;
        let ca = casted
            .f64()
            .map_err(|e| FlowsightError::DataError(e.to_string()))?;

        let mut values = Vec::with_capacity(ca.len());
        for (i, value) in ca.into_iter().enumerate() {
            values.push(value.ok_or_else(|| {
                FlowsightError::DataError(format!(
                    "non-numeric value in column '{}' at row {}",
                    name, i
                ))
            })?);
        }
        Ok(values)
    }
}
