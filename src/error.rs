//! Error types.
//!
//! - `ForecastError`: typed failures of the feature pipeline and prediction service
//! - `PredictorError`: failure reported by a `Predictor` implementation
//! - `AppError`: process-level error carrying the exit code of the `salecast` binary

use thiserror::Error;

/// Failure of the feature pipeline or the prediction service.
///
/// `row` values are the source labels carried by each `RawRecord`: 1-based CSV
/// line numbers for file input, record positions for programmatic input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    /// A record lacks a required field.
    #[error("row {row}: missing required field `{field}`")]
    Shape { row: usize, field: &'static str },

    /// A field is present but cannot be coerced to its expected type.
    #[error("{}field `{field}` has value '{value}', expected {expected}", row_prefix(.row))]
    Type {
        row: Option<usize>,
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// Batch input is missing required columns entirely.
    #[error("input must contain {} column(s); missing: {}", .required.join(", "), .missing.join(", "))]
    Schema {
        required: Vec<String>,
        missing: Vec<String>,
    },

    #[error(transparent)]
    Predictor(#[from] PredictorError),
}

fn row_prefix(row: &Option<usize>) -> String {
    match row {
        Some(row) => format!("row {row}: "),
        None => String::new(),
    }
}

/// Error reported by a predictor invocation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("predictor failed: {message}")]
pub struct PredictorError {
    message: String,
}

impl PredictorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        // Bad input exits with 2, runtime model failures with 4.
        let exit_code = match err {
            ForecastError::Shape { .. } | ForecastError::Type { .. } | ForecastError::Schema { .. } => 2,
            ForecastError::Predictor(_) => 4,
        };
        AppError::new(exit_code, format!("Error processing input: {err}"))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_lists_missing_columns() {
        let err = ForecastError::Schema {
            required: vec!["date".to_string(), "quantity".to_string()],
            missing: vec!["quantity".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "input must contain date, quantity column(s); missing: quantity"
        );
    }

    #[test]
    fn type_error_mentions_row_when_known() {
        let err = ForecastError::Type {
            row: Some(7),
            field: "quantity",
            value: "abc".to_string(),
            expected: "a non-negative real number",
        };
        assert_eq!(
            err.to_string(),
            "row 7: field `quantity` has value 'abc', expected a non-negative real number"
        );

        let err = ForecastError::Type {
            row: None,
            field: "lag_1",
            value: "-1".to_string(),
            expected: "a non-negative real number",
        };
        assert!(err.to_string().starts_with("field `lag_1`"));
    }

    #[test]
    fn exit_codes_separate_input_and_predictor_failures() {
        let shape = AppError::from(ForecastError::Shape { row: 3, field: "date" });
        assert_eq!(shape.exit_code(), 2);

        let predictor = AppError::from(ForecastError::from(PredictorError::new("boom")));
        assert_eq!(predictor.exit_code(), 4);
        assert!(predictor.to_string().contains("predictor failed: boom"));
    }
}
