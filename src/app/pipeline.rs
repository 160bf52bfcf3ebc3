//! Shared batch pipeline logic used by the `batch` and `features` commands.
//!
//! CSV ingest -> schema check -> feature build -> prediction
//!
//! The command handlers can then focus on presentation (printing vs export).

use std::path::Path;

use tracing::debug;

use crate::error::AppError;
use crate::features::{FeatureFrame, build_frame};
use crate::io::ingest::{SalesTable, load_sales_table};
use crate::models::Predictor;
use crate::service::{BatchPrediction, PredictionService};

/// All computed outputs of a single batch run.
#[derive(Debug, Clone)]
pub struct BatchRun {
    pub table: SalesTable,
    pub batch: BatchPrediction,
}

/// Load a CSV sales history and predict every row with a full lag history.
pub fn run_batch<P: Predictor>(service: &PredictionService<P>, csv_path: &Path) -> Result<BatchRun, AppError> {
    let table = load_sales_table(csv_path)?;
    let batch = service.predict_table(&table)?;
    debug!(
        read = batch.records_read(),
        predicted = batch.results.len(),
        dropped = batch.dropped(),
        "batch prediction complete"
    );
    Ok(BatchRun { table, batch })
}

/// Load a CSV sales history and build its feature rows without predicting.
pub fn run_features(csv_path: &Path) -> Result<(SalesTable, FeatureFrame), AppError> {
    let table = load_sales_table(csv_path)?;
    let records = table.raw_records()?;
    let frame = build_frame(&records)?;
    Ok((table, frame))
}
