//! CSV ingest.
//!
//! Reads an uploaded sales history into a `SalesTable` that keeps every
//! original column, so predictions can be exported next to the raw data.
//!
//! Design goals:
//! - **Strict schema** for `date` / `quantity` (checked before any row is converted)
//! - **Pass-through** of all other columns, unmodified
//! - **No silent repair**: empty or malformed cells are reported with their line number

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::domain::{DATE_COLUMN, QUANTITY_COLUMN, RawRecord};
use crate::error::{AppError, ForecastError};

/// A single data row of the uploaded table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// 1-based line number in the source file (the header is line 1).
    pub line: usize,
    pub cells: Vec<String>,
}

/// An uploaded sales table with its original headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesTable {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    header_map: HashMap<String, usize>,
}

impl SalesTable {
    pub fn new(headers: Vec<String>, rows: Vec<TableRow>) -> Self {
        let header_map = build_header_map(&headers);
        Self {
            headers,
            rows,
            header_map,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column, matched case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header_map.get(&normalize_header_name(name)).copied()
    }

    /// Resolve the `(date, quantity)` column indices.
    pub fn required_columns(&self) -> Result<(usize, usize), ForecastError> {
        let date = self.column_index(DATE_COLUMN);
        let quantity = self.column_index(QUANTITY_COLUMN);
        match (date, quantity) {
            (Some(d), Some(q)) => Ok((d, q)),
            _ => {
                let mut missing = Vec::new();
                if date.is_none() {
                    missing.push(DATE_COLUMN.to_string());
                }
                if quantity.is_none() {
                    missing.push(QUANTITY_COLUMN.to_string());
                }
                Err(ForecastError::Schema {
                    required: vec![DATE_COLUMN.to_string(), QUANTITY_COLUMN.to_string()],
                    missing,
                })
            }
        }
    }

    /// Convert rows to raw records labelled by line number.
    ///
    /// Fails with a schema error before touching any row if a required column
    /// is absent.
    pub fn raw_records(&self) -> Result<Vec<RawRecord>, ForecastError> {
        let (date_idx, quantity_idx) = self.required_columns()?;
        Ok(self
            .rows
            .iter()
            .map(|row| RawRecord {
                row: row.line,
                date: non_empty_cell(&row.cells, date_idx).map(Into::into),
                quantity: non_empty_cell(&row.cells, quantity_idx).map(Into::into),
            })
            .collect())
    }
}

/// Load a CSV file into a `SalesTable`.
pub fn load_sales_table(path: &Path) -> Result<SalesTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let table = read_sales_table(file)?;
    debug!(path = %path.display(), rows = table.len(), columns = table.headers.len(), "CSV loaded");
    Ok(table)
}

/// Read CSV data into a `SalesTable`.
pub fn read_sales_table<R: Read>(reader: R) -> Result<SalesTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            if idx == 0 {
                name.trim_start_matches('\u{feff}').to_string()
            } else {
                name.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        let record: StringRecord =
            result.map_err(|e| AppError::new(2, format!("CSV parse error on line {line}: {e}")))?;
        rows.push(TableRow {
            line,
            cells: record.iter().map(str::to_string).collect(),
        });
    }

    Ok(SalesTable::new(headers, rows))
}

fn build_header_map(headers: &[String]) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report a missing `date` column.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn non_empty_cell(cells: &[String], idx: usize) -> Option<String> {
    cells
        .get(idx)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
