//! Prediction service: bridges feature rows to a `Predictor`.
//!
//! Every call is all-or-nothing. Either each valid feature row gets exactly one
//! prediction, or the call fails and nothing is returned.

use tracing::debug;

use crate::domain::{DATE_COLUMN, FeatureRow, ManualInput, PredictionResult, QUANTITY_COLUMN, RawRecord};
use crate::error::{ForecastError, PredictorError};
use crate::features::{FeatureFrame, build_frame, ensure_non_negative};
use crate::io::ingest::SalesTable;
use crate::models::Predictor;

/// Batch predictions together with the feature frame they were computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPrediction {
    pub frame: FeatureFrame,
    /// One result per `frame.rows` entry, same order.
    pub results: Vec<PredictionResult>,
}

impl BatchPrediction {
    pub fn records_read(&self) -> usize {
        self.frame.records_read()
    }

    pub fn dropped(&self) -> usize {
        self.frame.dropped()
    }

    /// Predictions indexed by input position; `None` for warm-up rows.
    pub fn by_source(&self) -> Vec<Option<f64>> {
        let mut out = vec![None; self.frame.records_read()];
        for (row, result) in self.frame.rows.iter().zip(&self.results) {
            out[row.source] = Some(result.predicted_quantity);
        }
        out
    }
}

/// Runs manual and batch predictions against an injected predictor.
#[derive(Debug, Clone)]
pub struct PredictionService<P> {
    predictor: P,
}

impl<P: Predictor> PredictionService<P> {
    pub fn new(predictor: P) -> Self {
        Self { predictor }
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    /// Predict a single manually specified row.
    pub fn predict_manual(&self, input: &ManualInput) -> Result<PredictionResult, ForecastError> {
        let lag_1 = ensure_non_negative(input.lag_1, None, "lag_1")?;
        let lag_3 = ensure_non_negative(input.lag_3, None, "lag_3")?;
        let row = FeatureRow::from_date(input.date, lag_1, lag_3);

        let mut results = self.predict_rows(&[row])?;
        results.pop().ok_or_else(|| PredictorError::new("no prediction returned").into())
    }

    /// Build features from raw records and predict every valid row.
    ///
    /// Fewer than four records is not an error: the result is simply empty.
    pub fn predict_batch(&self, records: &[RawRecord]) -> Result<BatchPrediction, ForecastError> {
        check_fields_present(records)?;
        let frame = build_frame(records)?;
        let results = self.predict_rows(&frame.feature_rows())?;
        Ok(BatchPrediction { frame, results })
    }

    /// Validate an uploaded table's schema, then predict it as a batch.
    pub fn predict_table(&self, table: &SalesTable) -> Result<BatchPrediction, ForecastError> {
        let records = table.raw_records()?;
        self.predict_batch(&records)
    }

    /// Invoke the predictor and pair each output with its input row.
    pub fn predict_rows(&self, rows: &[FeatureRow]) -> Result<Vec<PredictionResult>, ForecastError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        debug!(rows = rows.len(), "invoking predictor");
        let predictions = self.predictor.predict(rows)?;
        if predictions.len() != rows.len() {
            return Err(PredictorError::new(format!(
                "expected {} predictions, got {}",
                rows.len(),
                predictions.len()
            ))
            .into());
        }

        Ok(rows
            .iter()
            .zip(predictions)
            .map(|(row, predicted_quantity)| PredictionResult {
                input_row: *row,
                predicted_quantity,
            })
            .collect())
    }
}

/// A field absent from every record means the input has no such column at all.
fn check_fields_present(records: &[RawRecord]) -> Result<(), ForecastError> {
    if records.is_empty() {
        return Ok(());
    }

    let mut missing = Vec::new();
    if records.iter().all(|r| r.date.is_none()) {
        missing.push(DATE_COLUMN.to_string());
    }
    if records.iter().all(|r| r.quantity.is_none()) {
        missing.push(QUANTITY_COLUMN.to_string());
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ForecastError::Schema {
            required: vec![DATE_COLUMN.to_string(), QUANTITY_COLUMN.to_string()],
            missing,
        })
    }
}
