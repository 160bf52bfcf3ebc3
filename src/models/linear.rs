//! Linear regression model artifacts.
//!
//! A model artifact is a JSON file produced by the training side, e.g.
//!
//! ```text
//! {
//!   "model": "linear",
//!   "features": ["year", "month", "day", "lag_1", "lag_3"],
//!   "intercept": 1.5,
//!   "coefficients": [0.0, 0.1, 0.0, 0.8, 0.1]
//! }
//! ```
//!
//! The feature list must match `FEATURE_COLUMNS` exactly; an artifact trained
//! on a different feature layout is rejected at load time rather than fed
//! misaligned inputs.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{FEATURE_COLUMNS, FEATURE_COUNT, FeatureRow};
use crate::error::{AppError, PredictorError};
use crate::models::Predictor;

/// A persisted model, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum ModelArtifact {
    Linear(LinearModel),
}

impl ModelArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::Linear(_) => "linear",
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            ModelArtifact::Linear(model) => model.validate(),
        }
    }
}

impl Predictor for ModelArtifact {
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, PredictorError> {
        match self {
            ModelArtifact::Linear(model) => model.predict(rows),
        }
    }
}

/// `y = intercept + Σ coefficient_j * feature_j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub features: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    fn validate(&self) -> Result<(), String> {
        if self.features.len() != FEATURE_COUNT
            || self.features.iter().zip(FEATURE_COLUMNS).any(|(a, b)| a != b)
        {
            return Err(format!(
                "model features [{}] do not match expected [{}]",
                self.features.join(", "),
                FEATURE_COLUMNS.join(", ")
            ));
        }
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(format!(
                "expected {FEATURE_COUNT} coefficients, found {}",
                self.coefficients.len()
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("model parameters must be finite".to_string());
        }
        Ok(())
    }
}

impl Predictor for LinearModel {
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, PredictorError> {
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(PredictorError::new(format!(
                "model has {} coefficients, input rows have {FEATURE_COUNT} features",
                self.coefficients.len()
            )));
        }
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<f64> = rows.iter().flat_map(|r| r.to_vector()).collect();
        let design = DMatrix::from_row_slice(rows.len(), FEATURE_COUNT, &values);
        let beta = DVector::from_column_slice(&self.coefficients);
        let fitted = design * beta;

        let mut out = Vec::with_capacity(rows.len());
        for (idx, v) in fitted.iter().enumerate() {
            let y = v + self.intercept;
            if !y.is_finite() {
                return Err(PredictorError::new(format!("non-finite prediction for input row {idx}")));
            }
            out.push(y);
        }
        debug!(rows = rows.len(), "linear model evaluated");
        Ok(out)
    }
}

/// Load and validate a model artifact from disk.
pub fn load_model(path: &Path) -> Result<ModelArtifact, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open model '{}': {e}", path.display())))?;
    let model = read_model(file)
        .map_err(|e| AppError::new(2, format!("Invalid model '{}': {e}", path.display())))?;
    info!(path = %path.display(), kind = model.kind(), "model loaded");
    Ok(model)
}

/// Parse and validate a model artifact.
pub fn read_model<R: Read>(reader: R) -> Result<ModelArtifact, String> {
    let model: ModelArtifact = serde_json::from_reader(reader).map_err(|e| e.to_string())?;
    model.validate()?;
    Ok(model)
}
