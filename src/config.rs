//! Run configuration resolved from CLI flags, environment and defaults.

use std::path::PathBuf;

/// Environment variable naming the model artifact.
pub const MODEL_ENV: &str = "SALECAST_MODEL";
/// Model artifact used when neither the flag nor the environment names one.
pub const DEFAULT_MODEL_PATH: &str = "SalesModel.json";
/// Default batch export file.
pub const DEFAULT_OUTPUT_PATH: &str = "sales_predictions.csv";

/// Resolve the model path: `--model`, then `$SALECAST_MODEL` (a `.env` file is
/// honoured), then `SalesModel.json`.
pub fn resolve_model_path(flag: Option<PathBuf>) -> PathBuf {
    dotenvy::dotenv().ok();
    model_path_from(flag, std::env::var(MODEL_ENV).ok())
}

fn model_path_from(flag: Option<PathBuf>, env: Option<String>) -> PathBuf {
    flag.or_else(|| env.filter(|s| !s.trim().is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH))
}
