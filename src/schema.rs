//! The shared feature schema for network flow records.
//!
//! The prediction form and the evaluation panel must assemble feature
//! matrices with identical column order; both consume [`FEATURE_COLUMNS`]
//! so the schema exists in exactly one place.

use serde::{Deserialize, Serialize};

/// Ordered feature columns the classifier was trained on.
pub const FEATURE_COLUMNS: [&str; 11] = [
    "Source Port",
    "Destination Port",
    "NAT Source Port",
    "NAT Destination Port",
    "Bytes",
    "Bytes Sent",
    "Bytes Received",
    "Packets",
    "Elapsed Time (sec)",
    "pkts_sent",
    "pkts_received",
];

/// Form defaults, index-aligned with [`FEATURE_COLUMNS`].
pub const FORM_DEFAULTS: [f64; 11] = [
    12345.0, 443.0, 56789.0, 443.0, 1000.0, 500.0, 500.0, 10.0, 60.0, 5.0, 5.0,
];

/// Categorical label column in the dataset.
pub const ACTION_COLUMN: &str = "Action";

/// Encoded label column, derived in memory when the CSV lacks it.
pub const ENCODED_COLUMN: &str = "Action_encoded";

/// Number of rows shown in the dataset preview.
pub const PREVIEW_ROWS: usize = 5;

/// One network flow record as submitted by the prediction form.
///
/// Field names on the wire match [`FEATURE_COLUMNS`] exactly; values are
/// accepted unvalidated (no range or sign constraints).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureRecord {
    #[serde(rename = "Source Port")]
    pub source_port: f64,
    #[serde(rename = "Destination Port")]
    pub destination_port: f64,
    #[serde(rename = "NAT Source Port")]
    pub nat_source_port: f64,
    #[serde(rename = "NAT Destination Port")]
    pub nat_destination_port: f64,
    #[serde(rename = "Bytes")]
    pub bytes: f64,
    #[serde(rename = "Bytes Sent")]
    pub bytes_sent: f64,
    #[serde(rename = "Bytes Received")]
    pub bytes_received: f64,
    #[serde(rename = "Packets")]
    pub packets: f64,
    #[serde(rename = "Elapsed Time (sec)")]
    pub elapsed_time_sec: f64,
    #[serde(rename = "pkts_sent")]
    pub pkts_sent: f64,
    #[serde(rename = "pkts_received")]
    pub pkts_received: f64,
}

impl FeatureRecord {
    /// Flatten into a feature row ordered per [`FEATURE_COLUMNS`].
    pub fn to_row(&self) -> [f64; 11] {
        [
            self.source_port,
            self.destination_port,
            self.nat_source_port,
            self.nat_destination_port,
            self.bytes,
            self.bytes_sent,
            self.bytes_received,
            self.packets,
            self.elapsed_time_sec,
            self.pkts_sent,
            self.pkts_received,
        ]
    }
}

impl Default for FeatureRecord {
    fn default() -> Self {
        Self {
            source_port: FORM_DEFAULTS[0],
            destination_port: FORM_DEFAULTS[1],
            nat_source_port: FORM_DEFAULTS[2],
            nat_destination_port: FORM_DEFAULTS[3],
            bytes: FORM_DEFAULTS[4],
            bytes_sent: FORM_DEFAULTS[5],
            bytes_received: FORM_DEFAULTS[6],
            packets: FORM_DEFAULTS[7],
            elapsed_time_sec: FORM_DEFAULTS[8],
            pkts_sent: FORM_DEFAULTS[9],
            pkts_received: FORM_DEFAULTS[10],
        }
    }
}
