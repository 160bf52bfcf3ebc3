//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built from CSV uploads or manual input
//! - handed to a `Predictor` as model input
//! - exported to CSV alongside predictions

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Required input column holding the observation date.
pub const DATE_COLUMN: &str = "date";
/// Required input column holding the observed sales quantity.
pub const QUANTITY_COLUMN: &str = "quantity";
/// Column appended to batch exports.
pub const PREDICTION_COLUMN: &str = "predicted_quantity";

/// Number of model input features.
pub const FEATURE_COUNT: usize = 5;

/// Model input columns, in the order the model expects them.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = ["year", "month", "day", "lag_1", "lag_3"];

/// A normalized sales observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    pub quantity: f64,
}

/// Date value as supplied by the caller.
///
/// Uploaded tables carry dates as text; programmatic callers may already hold
/// a calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    Date(NaiveDate),
    Text(String),
}

impl From<NaiveDate> for DateInput {
    fn from(value: NaiveDate) -> Self {
        DateInput::Date(value)
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Text(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        DateInput::Text(value)
    }
}

/// Quantity value as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantityInput {
    Number(f64),
    Text(String),
}

impl From<f64> for QuantityInput {
    fn from(value: f64) -> Self {
        QuantityInput::Number(value)
    }
}

impl From<&str> for QuantityInput {
    fn from(value: &str) -> Self {
        QuantityInput::Text(value.to_string())
    }
}

impl From<String> for QuantityInput {
    fn from(value: String) -> Self {
        QuantityInput::Text(value)
    }
}

/// A raw `(date, quantity)` record before normalization.
///
/// `row` identifies the record in error messages: the CSV line number for
/// uploaded files, the position in the input sequence otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub row: usize,
    pub date: Option<DateInput>,
    pub quantity: Option<QuantityInput>,
}

impl RawRecord {
    pub fn new(row: usize, date: impl Into<DateInput>, quantity: impl Into<QuantityInput>) -> Self {
        Self {
            row,
            date: Some(date.into()),
            quantity: Some(quantity.into()),
        }
    }

    /// Build raw records from typed records, labelling each by its position.
    pub fn from_records(records: &[Record]) -> Vec<RawRecord> {
        records
            .iter()
            .enumerate()
            .map(|(idx, r)| RawRecord::new(idx, r.date, r.quantity))
            .collect()
    }
}

/// The fixed-shape model input derived from a record and its history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub lag_1: f64,
    pub lag_3: f64,
}

impl FeatureRow {
    /// Decompose `date` into calendar features and attach the lag values.
    pub fn from_date(date: NaiveDate, lag_1: f64, lag_3: f64) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            lag_1,
            lag_3,
        }
    }

    /// Feature values in `FEATURE_COLUMNS` order.
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.year),
            f64::from(self.month),
            f64::from(self.day),
            self.lag_1,
            self.lag_3,
        ]
    }
}

/// A prediction paired with the feature row it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub input_row: FeatureRow,
    pub predicted_quantity: f64,
}

/// Manually entered prediction request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualInput {
    pub date: NaiveDate,
    /// Sales from the previous period.
    pub lag_1: f64,
    /// Sales from three periods ago.
    pub lag_3: f64,
}

/// Where batch output is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// `-` selects stdout, anything else is a file path.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(PathBuf::from(arg))
        }
    }
}

/// A batch run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and environment).
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub model_path: PathBuf,
    pub csv_path: PathBuf,
    pub output: OutputTarget,
    /// Number of raw rows echoed before predicting.
    pub preview_rows: usize,
}
