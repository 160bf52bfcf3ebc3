//! The predictor contract.

use std::sync::Arc;

use crate::domain::FeatureRow;
use crate::error::PredictorError;

/// A trained model mapping feature rows to predicted quantities.
///
/// Implementations must return exactly one value per input row, in input
/// order, and must not mutate shared state: a predictor is loaded once and
/// shared read-only for the life of the process.
pub trait Predictor: Send + Sync {
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, PredictorError>;
}

impl<P: Predictor + ?Sized> Predictor for &P {
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, PredictorError> {
        (**self).predict(rows)
    }
}

impl<P: Predictor + ?Sized> Predictor for Box<P> {
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, PredictorError> {
        (**self).predict(rows)
    }
}

impl<P: Predictor + ?Sized> Predictor for Arc<P> {
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, PredictorError> {
        (**self).predict(rows)
    }
}
