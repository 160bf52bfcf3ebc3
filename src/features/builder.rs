//! Feature construction.
//!
//! Turns a raw `(date, quantity)` record stream into model input rows:
//!
//! 1) normalize dates and quantities (typed errors, no defaults)
//! 2) order records chronologically (stable on equal dates)
//! 3) decompose each date into year/month/day
//! 4) attach the quantities one and three positions earlier
//! 5) drop the warm-up rows whose lag history is incomplete
//!
//! Lags are positional, not calendar-based: `lag_1` is the previous record in
//! date order, whatever the gap between the two dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::domain::{DATE_COLUMN, DateInput, FeatureRow, QUANTITY_COLUMN, QuantityInput, RawRecord, Record};
use crate::error::ForecastError;

/// Offset of the short lag feature (`lag_1`).
pub const SHORT_LAG: usize = 1;
/// Offset of the long lag feature (`lag_3`).
pub const LONG_LAG: usize = 3;

/// Number of leading records that cannot produce a feature row.
pub const WARM_UP: usize = if LONG_LAG > SHORT_LAG { LONG_LAG } else { SHORT_LAG };

const QUANTITY_EXPECTED: &str = "a non-negative real number";
const DATE_EXPECTED: &str =
    "a date (YYYY-MM-DD, YYYY/MM/DD, YYYYMMDD, MM/DD/YYYY, DD/MM/YYYY when the day exceeds 12, or an ISO date-time)";

/// A feature row plus the input position of the record it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedRow {
    pub source: usize,
    pub features: FeatureRow,
}

/// Output of a feature build, keeping the link back to the input records.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    /// Input positions in chronological order.
    pub order: Vec<usize>,
    /// Valid feature rows in chronological order.
    pub rows: Vec<AlignedRow>,
}

impl FeatureFrame {
    pub fn records_read(&self) -> usize {
        self.order.len()
    }

    /// Records that produced no feature row (incomplete lag history).
    pub fn dropped(&self) -> usize {
        self.order.len() - self.rows.len()
    }

    pub fn feature_rows(&self) -> Vec<FeatureRow> {
        self.rows.iter().map(|r| r.features).collect()
    }
}

/// Build model input rows from raw records.
///
/// Returns `max(0, N - 3)` rows for `N` records.
pub fn build_features(records: &[RawRecord]) -> Result<Vec<FeatureRow>, ForecastError> {
    Ok(build_frame(records)?.feature_rows())
}

/// Build model input rows and keep their alignment with the input records.
pub fn build_frame(records: &[RawRecord]) -> Result<FeatureFrame, ForecastError> {
    let normalized = normalize_records(records)?;
    Ok(frame_from_records(&normalized))
}

/// Build model input rows from already-normalized records.
pub fn frame_from_records(records: &[Record]) -> FeatureFrame {
    let order = chronological_order(records);
    if order.iter().enumerate().any(|(pos, &idx)| pos != idx) {
        warn!(records = records.len(), "input was not in chronological order; sorted by date");
    }

    let rows: Vec<AlignedRow> = (WARM_UP..order.len())
        .map(|pos| {
            let current = &records[order[pos]];
            let lag_1 = records[order[pos - SHORT_LAG]].quantity;
            let lag_3 = records[order[pos - LONG_LAG]].quantity;
            AlignedRow {
                source: order[pos],
                features: FeatureRow::from_date(current.date, lag_1, lag_3),
            }
        })
        .collect();

    debug!(
        records = records.len(),
        rows = rows.len(),
        dropped = records.len() - rows.len(),
        "built feature rows"
    );

    FeatureFrame { order, rows }
}

/// Input positions sorted by date; ties keep their input order.
pub fn chronological_order(records: &[Record]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by_key(|&idx| records[idx].date);
    order
}

/// Normalize every raw record, failing on the first invalid one.
pub fn normalize_records(records: &[RawRecord]) -> Result<Vec<Record>, ForecastError> {
    records.iter().map(normalize_record).collect()
}

pub fn normalize_record(raw: &RawRecord) -> Result<Record, ForecastError> {
    let date = match &raw.date {
        None => {
            return Err(ForecastError::Shape {
                row: raw.row,
                field: DATE_COLUMN,
            });
        }
        Some(DateInput::Date(d)) => *d,
        Some(DateInput::Text(s)) => parse_date(s).ok_or_else(|| ForecastError::Type {
            row: Some(raw.row),
            field: DATE_COLUMN,
            value: s.clone(),
            expected: DATE_EXPECTED,
        })?,
    };

    let quantity = match &raw.quantity {
        None => {
            return Err(ForecastError::Shape {
                row: raw.row,
                field: QUANTITY_COLUMN,
            });
        }
        Some(QuantityInput::Number(v)) => *v,
        Some(QuantityInput::Text(s)) => s.trim().parse::<f64>().map_err(|_| ForecastError::Type {
            row: Some(raw.row),
            field: QUANTITY_COLUMN,
            value: s.clone(),
            expected: QUANTITY_EXPECTED,
        })?,
    };
    ensure_non_negative(quantity, Some(raw.row), QUANTITY_COLUMN)?;

    Ok(Record { date, quantity })
}

/// Reject non-finite and negative values.
pub fn ensure_non_negative(value: f64, row: Option<usize>, field: &'static str) -> Result<f64, ForecastError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ForecastError::Type {
            row,
            field,
            value: value.to_string(),
            expected: QUANTITY_EXPECTED,
        })
    }
}

/// Parse a date-like string.
///
/// ISO dates are preferred. Slash and dash dates are read month-first and fall
/// back to day-first only when the month-first reading is impossible
/// (`15/03/2024`). Date-times are truncated to their calendar date; with an
/// offset, the date is the one local to that offset.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    const DATE_FMTS: [&str; 6] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y", "%d/%m/%Y", "%d-%m-%Y"];
    const DATETIME_FMTS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
    const OFFSET_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

    let s = s.trim();
    if let Some(d) = parse_compact_date(s) {
        return Some(d);
    }
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in OFFSET_FMTS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.date_naive());
        }
    }
    None
}

/// `YYYYMMDD` with no separators.
fn parse_compact_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = s[..4].parse().ok()?;
    let month = s[4..6].parse().ok()?;
    let day = s[6..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily_series(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record {
                date: date(2024, 1, 1) + chrono::Duration::days(i as i64),
                quantity: (i * 10 + 1) as f64,
            })
            .collect()
    }

    #[test]
    fn four_records_yield_one_row() {
        let raw = vec![
            RawRecord::new(2, "2024-01-01", "10"),
            RawRecord::new(3, "2024-01-02", "12"),
            RawRecord::new(4, "2024-01-03", "9"),
            RawRecord::new(5, "2024-01-04", "15"),
        ];
        let rows = build_features(&raw).unwrap();
        assert_eq!(
            rows,
            vec![FeatureRow {
                year: 2024,
                month: 1,
                day: 4,
                lag_1: 9.0,
                lag_3: 10.0,
            }]
        );
    }

    #[test]
    fn row_count_is_n_minus_warm_up() {
        for n in 0..12 {
            let records = daily_series(n);
            let frame = frame_from_records(&records);
            assert_eq!(frame.rows.len(), n.saturating_sub(3), "n={n}");
            assert_eq!(frame.dropped(), n.min(3), "n={n}");

            for row in &frame.rows {
                let pos = row.source;
                assert_eq!(row.features.lag_1, records[pos - 1].quantity);
                assert_eq!(row.features.lag_3, records[pos - 3].quantity);
            }
        }
    }

    #[test]
    fn shuffled_input_matches_sorted_input() {
        let records = daily_series(20);
        let expected = frame_from_records(&records).feature_rows();

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let mut shuffled = records.clone();
            shuffled.shuffle(&mut rng);
            assert_eq!(frame_from_records(&shuffled).feature_rows(), expected);
        }
    }

    #[test]
    fn equal_dates_keep_input_order() {
        let d = date(2024, 5, 1);
        let records = vec![
            Record { date: date(2024, 5, 2), quantity: 99.0 },
            Record { date: d, quantity: 1.0 },
            Record { date: d, quantity: 2.0 },
            Record { date: d, quantity: 3.0 },
        ];
        assert_eq!(chronological_order(&records), vec![1, 2, 3, 0]);

        let rows = frame_from_records(&records).feature_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].lag_1, 3.0);
        assert_eq!(rows[0].lag_3, 1.0);
    }

    #[test]
    fn aligned_rows_point_back_to_unsorted_input() {
        let records = vec![
            Record { date: date(2024, 1, 4), quantity: 15.0 },
            Record { date: date(2024, 1, 1), quantity: 10.0 },
            Record { date: date(2024, 1, 3), quantity: 9.0 },
            Record { date: date(2024, 1, 2), quantity: 12.0 },
        ];
        let frame = frame_from_records(&records);
        assert_eq!(frame.order, vec![1, 3, 2, 0]);
        assert_eq!(frame.rows.len(), 1);
        assert_eq!(frame.rows[0].source, 0);
        assert_eq!(frame.rows[0].features.lag_1, 9.0);
        assert_eq!(frame.rows[0].features.lag_3, 10.0);
    }

    #[test]
    fn repeated_builds_are_identical() {
        let raw = RawRecord::from_records(&daily_series(9));
        let first = build_features(&raw).unwrap();
        let second = build_features(&raw).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_field_is_shape_error() {
        let raw = vec![
            RawRecord::new(2, "2024-01-01", "10"),
            RawRecord {
                row: 3,
                date: Some("2024-01-02".into()),
                quantity: None,
            },
        ];
        assert_eq!(
            build_features(&raw).unwrap_err(),
            ForecastError::Shape { row: 3, field: "quantity" }
        );
    }

    #[test]
    fn unparseable_values_are_type_errors() {
        let raw = vec![RawRecord::new(4, "yesterday", "10")];
        match build_features(&raw).unwrap_err() {
            ForecastError::Type { row, field, value, .. } => {
                assert_eq!(row, Some(4));
                assert_eq!(field, "date");
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let raw = vec![RawRecord::new(5, "2024-01-01", "ten")];
        assert!(matches!(
            build_features(&raw).unwrap_err(),
            ForecastError::Type { field: "quantity", .. }
        ));

        let raw = vec![RawRecord::new(6, "2024-01-01", -3.0)];
        assert!(matches!(
            build_features(&raw).unwrap_err(),
            ForecastError::Type { field: "quantity", .. }
        ));

        let raw = vec![RawRecord::new(7, "2024-01-01", "NaN")];
        assert!(matches!(
            build_features(&raw).unwrap_err(),
            ForecastError::Type { field: "quantity", .. }
        ));
    }

    #[test]
    fn parse_date_accepts_common_formats() {
        let expected = Some(date(2024, 3, 15));
        assert_eq!(parse_date("2024-03-15"), expected);
        assert_eq!(parse_date("2024/03/15"), expected);
        assert_eq!(parse_date("15/03/2024"), expected);
        assert_eq!(parse_date("15-03-2024"), expected);
        assert_eq!(parse_date("2024-03-15T08:30:00"), expected);
        assert_eq!(parse_date("2024-03-15 23:59:59"), expected);
        assert_eq!(parse_date(" 2024-03-15 "), expected);
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn slash_dates_are_month_first() {
        assert_eq!(parse_date("03/04/2024"), Some(date(2024, 3, 4)));
        assert_eq!(parse_date("03-04-2024"), Some(date(2024, 3, 4)));
        assert_eq!(parse_date("12/25/2024"), Some(date(2024, 12, 25)));
        assert_eq!(parse_date("25/12/2024"), Some(date(2024, 12, 25)));
        assert_eq!(parse_date("13/13/2024"), None);
    }

    #[test]
    fn parse_date_accepts_offsets_and_compact_dates() {
        let expected = Some(date(2024, 3, 15));
        assert_eq!(parse_date("2024-03-15T08:30:00Z"), expected);
        assert_eq!(parse_date("2024-03-15T08:30:00+00:00"), expected);
        assert_eq!(parse_date("2024-03-15T23:30:00-05:00"), expected);
        assert_eq!(parse_date("2024-03-15 08:30:00+01:00"), expected);
        assert_eq!(parse_date("20240315"), expected);
        assert_eq!(parse_date("20241315"), None);
    }

    #[test]
    fn us_format_history_builds() {
        let raw = vec![
            RawRecord::new(2, "12/22/2024", "10"),
            RawRecord::new(3, "12/23/2024", "12"),
            RawRecord::new(4, "12/24/2024", "9"),
            RawRecord::new(5, "12/25/2024", "15"),
        ];
        let rows = build_features(&raw).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].year, rows[0].month, rows[0].day), (2024, 12, 25));
        assert_eq!(rows[0].lag_1, 9.0);
        assert_eq!(rows[0].lag_3, 10.0);
    }

    #[test]
    fn shuffled_raw_records_match_sorted_raw_records() {
        let raw: Vec<RawRecord> = daily_series(15)
            .iter()
            .enumerate()
            .map(|(i, r)| RawRecord::new(i, r.date.format("%m/%d/%Y").to_string(), r.quantity.to_string()))
            .collect();
        let expected = build_features(&raw).unwrap();
        assert_eq!(expected.len(), 12);

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..10 {
            let mut shuffled = raw.clone();
            shuffled.shuffle(&mut rng);
            assert_eq!(build_features(&shuffled).unwrap(), expected);
        }
    }

    #[test]
    fn typed_dates_skip_parsing() {
        let raw = vec![
            RawRecord::new(0, date(2024, 2, 1), 1.0),
            RawRecord::new(1, "2024-02-02", 2.0),
            RawRecord::new(2, date(2024, 2, 3), "3"),
            RawRecord::new(3, "02/04/2024", 4.0),
        ];
        let rows = build_features(&raw).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].year, rows[0].month, rows[0].day), (2024, 2, 4));
        assert_eq!(rows[0].lag_1, 3.0);
        assert_eq!(rows[0].lag_3, 1.0);
    }
}
