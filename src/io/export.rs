//! Export batch predictions and feature rows to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! every input column is echoed unmodified and `predicted_quantity` is appended.

use std::fs::File;
use std::io::Write;

use tracing::info;

use crate::domain::{FeatureRow, OutputTarget, PREDICTION_COLUMN};
use crate::error::AppError;
use crate::io::ingest::SalesTable;
use crate::service::BatchPrediction;

/// Write the prediction table to a file or stdout.
pub fn export_predictions(target: &OutputTarget, table: &SalesTable, batch: &BatchPrediction) -> Result<(), AppError> {
    match target {
        OutputTarget::Stdout => write_predictions(std::io::stdout().lock(), table, batch),
        OutputTarget::File(path) => {
            let file = File::create(path)
                .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
            write_predictions(file, table, batch)?;
            info!(path = %path.display(), rows = table.len(), "predictions exported");
            Ok(())
        }
    }
}

/// Write the input table in chronological order plus a `predicted_quantity` column.
///
/// Warm-up rows (no full lag history) are kept with an empty prediction cell.
pub fn write_predictions<W: Write>(writer: W, table: &SalesTable, batch: &BatchPrediction) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = table.headers.iter().map(String::as_str).collect();
    header.push(PREDICTION_COLUMN);
    wtr.write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let predictions = batch.by_source();
    let width = table.headers.len();
    for &idx in &batch.frame.order {
        let row = table
            .rows
            .get(idx)
            .ok_or_else(|| AppError::new(4, format!("Prediction refers to missing input row {idx}.")))?;

        // Short rows are padded so every output line has the same width.
        let mut cells: Vec<String> = row.cells.clone();
        if cells.len() < width {
            cells.resize(width, String::new());
        }
        cells.push(predictions[idx].map(|v| v.to_string()).unwrap_or_default());

        wtr.write_record(&cells)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row (line {}): {e}", row.line)))?;
    }

    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write feature rows to a file or stdout.
pub fn export_features(target: &OutputTarget, rows: &[FeatureRow]) -> Result<(), AppError> {
    match target {
        OutputTarget::Stdout => write_features(std::io::stdout().lock(), rows),
        OutputTarget::File(path) => {
            let file = File::create(path)
                .map_err(|e| AppError::new(2, format!("Failed to create features CSV '{}': {e}", path.display())))?;
            write_features(file, rows)?;
            info!(path = %path.display(), rows = rows.len(), "features exported");
            Ok(())
        }
    }
}

/// Write feature rows with a `year,month,day,lag_1,lag_3` header.
pub fn write_features<W: Write>(writer: W, rows: &[FeatureRow]) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        // serde only emits the header alongside the first row.
        wtr.write_record(crate::domain::FEATURE_COLUMNS)
            .map_err(|e| AppError::new(2, format!("Failed to write features CSV header: {e}")))?;
    }
    for row in rows {
        wtr.serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write features CSV row: {e}")))?;
    }
    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush features CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PredictorError;
    use crate::io::ingest::read_sales_table;
    use crate::models::Predictor;
    use crate::service::PredictionService;

    struct LagSum;

    impl Predictor for LagSum {
        fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, PredictorError> {
            Ok(rows.iter().map(|r| r.lag_1 + r.lag_3).collect())
        }
    }

    fn export(csv: &str) -> String {
        let table = read_sales_table(csv.as_bytes()).unwrap();
        let batch = PredictionService::new(LagSum).predict_table(&table).unwrap();
        let mut out = Vec::new();
        write_predictions(&mut out, &table, &batch).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn echoes_columns_and_appends_predictions() {
        let out = export(
            "date,quantity,store\n\
             2024-01-01,10,north\n\
             2024-01-02,12,north\n\
             2024-01-03,9,\"north, east\"\n\
             2024-01-04,15,south\n",
        );
        assert_eq!(
            out,
            "date,quantity,store,predicted_quantity\n\
             2024-01-01,10,north,\n\
             2024-01-02,12,north,\n\
             2024-01-03,9,\"north, east\",\n\
             2024-01-04,15,south,19\n"
        );
    }

    #[test]
    fn output_is_chronological() {
        let out = export(
            "date,quantity\n\
             2024-01-04,15\n\
             2024-01-02,12\n\
             2024-01-01,10\n\
             2024-01-03,9\n\
             2024-01-05,1.5\n",
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "2024-01-01,10,");
        assert_eq!(lines[4], "2024-01-04,15,19");
        assert_eq!(lines[5], "2024-01-05,1.5,27");
    }

    #[test]
    fn features_csv_has_header_even_when_empty() {
        let mut out = Vec::new();
        write_features(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "year,month,day,lag_1,lag_3\n");

        let row = FeatureRow {
            year: 2024,
            month: 1,
            day: 4,
            lag_1: 9.0,
            lag_3: 10.0,
        };
        let mut out = Vec::new();
        write_features(&mut out, &[row]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "year,month,day,lag_1,lag_3\n2024,1,4,9.0,10.0\n"
        );
    }
}
