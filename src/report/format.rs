//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the feature/prediction code stays clean and testable
//! - output changes are localized

use crate::domain::{FEATURE_COLUMNS, FeatureRow, PredictionResult};
use crate::io::ingest::SalesTable;
use crate::service::BatchPrediction;

/// One-line answer for a manual prediction.
pub fn format_manual_prediction(result: &PredictionResult) -> String {
    format!("Predicted Sales: {:.2}", result.predicted_quantity)
}

/// The first `n` raw rows, as uploaded.
pub fn format_preview(table: &SalesTable, n: usize) -> String {
    let mut out = String::new();
    out.push_str("Raw Data Preview:\n");

    let rows: Vec<&[String]> = table.rows.iter().take(n).map(|r| r.cells.as_slice()).collect();
    out.push_str(&format_grid(&table.headers, &rows));

    if table.len() > n {
        out.push_str(&format!("... ({} more rows)\n", table.len() - n));
    }
    out
}

/// Rows read, predicted and dropped for a batch run.
pub fn format_batch_summary(batch: &BatchPrediction) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Rows: read={} | predicted={} | dropped (incomplete lag history)={}\n",
        batch.records_read(),
        batch.results.len(),
        batch.dropped(),
    ));

    if let Some(stats) = prediction_stats(&batch.results) {
        out.push_str(&format!(
            "Predicted quantity: min={:.2} | mean={:.2} | max={:.2}\n",
            stats.min, stats.mean, stats.max
        ));
    }
    out
}

/// Feature rows as an aligned table.
pub fn format_feature_rows(rows: &[FeatureRow]) -> String {
    let headers: Vec<String> = FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.year.to_string(),
                r.month.to_string(),
                r.day.to_string(),
                fmt_quantity(r.lag_1),
                fmt_quantity(r.lag_3),
            ]
        })
        .collect();
    let refs: Vec<&[String]> = cells.iter().map(Vec::as_slice).collect();
    format_grid(&headers, &refs)
}

struct PredictionStats {
    min: f64,
    mean: f64,
    max: f64,
}

fn prediction_stats(results: &[PredictionResult]) -> Option<PredictionStats> {
    if results.is_empty() {
        return None;
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for r in results {
        min = min.min(r.predicted_quantity);
        max = max.max(r.predicted_quantity);
        sum += r.predicted_quantity;
    }
    Some(PredictionStats {
        min,
        mean: sum / results.len() as f64,
        max,
    })
}

fn fmt_quantity(v: f64) -> String {
    if v.fract() == 0.0 { format!("{v:.0}") } else { format!("{v}") }
}

fn format_grid(headers: &[String], rows: &[&[String]]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(idx) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format_line(headers, &widths));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format_line(&rule, &widths));
    for row in rows {
        out.push_str(&format_line(row, &widths));
    }
    out
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let parts: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(idx, &w)| {
            let cell = cells.get(idx).map(String::as_str).unwrap_or("");
            format!("{cell:<w$}")
        })
        .collect();
    let mut line = parts.join("  ").trim_end().to_string();
    line.push('\n');
    line
}
