//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the model artifact once
//! - runs manual or batch predictions
//! - prints reports and writes exports

use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Parser;

use crate::cli::{BatchArgs, Command, FeaturesArgs, PredictArgs};
use crate::config::resolve_model_path;
use crate::domain::{BatchConfig, ManualInput, OutputTarget};
use crate::error::AppError;
use crate::models::{ModelArtifact, load_model};
use crate::service::PredictionService;

pub mod pipeline;

/// Entry point for the `salecast` binary.
pub fn run() -> Result<(), AppError> {
    crate::logging::init_tracing();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Predict(args) => handle_predict(args, cli.model),
        Command::Batch(args) => handle_batch(args, cli.model),
        Command::Features(args) => handle_features(args),
    }
}

fn load_service(model_path: &Path) -> Result<PredictionService<ModelArtifact>, AppError> {
    Ok(PredictionService::new(load_model(model_path)?))
}

fn handle_predict(args: PredictArgs, model: Option<PathBuf>) -> Result<(), AppError> {
    let service = load_service(&resolve_model_path(model))?;
    let input = manual_input_from_args(&args);
    let result = service.predict_manual(&input)?;
    println!("{}", crate::report::format_manual_prediction(&result));
    Ok(())
}

fn handle_batch(args: BatchArgs, model: Option<PathBuf>) -> Result<(), AppError> {
    let config = batch_config_from_args(&args, model);
    let service = load_service(&config.model_path)?;
    let run = pipeline::run_batch(&service, &config.csv_path)?;

    // Keep stdout clean for the CSV when exporting there.
    let to_stdout = config.output == OutputTarget::Stdout;
    if !to_stdout {
        println!("{}", crate::report::format_preview(&run.table, config.preview_rows));
        print!("{}", crate::report::format_batch_summary(&run.batch));
    }

    crate::io::export::export_predictions(&config.output, &run.table, &run.batch)?;

    if let OutputTarget::File(path) = &config.output {
        println!("Predictions written to {}", path.display());
    }
    Ok(())
}

fn handle_features(args: FeaturesArgs) -> Result<(), AppError> {
    let (_, frame) = pipeline::run_features(&args.input)?;
    let rows = frame.feature_rows();

    match args.output.as_deref().map(OutputTarget::from_arg) {
        Some(target) => crate::io::export::export_features(&target, &rows)?,
        None => {
            print!("{}", crate::report::format_feature_rows(&rows));
            println!(
                "({} rows, {} dropped for incomplete lag history)",
                rows.len(),
                frame.dropped()
            );
        }
    }
    Ok(())
}

pub fn manual_input_from_args(args: &PredictArgs) -> ManualInput {
    ManualInput {
        date: args.date.unwrap_or_else(|| Local::now().date_naive()),
        lag_1: args.lag_1,
        lag_3: args.lag_3,
    }
}

pub fn batch_config_from_args(args: &BatchArgs, model: Option<PathBuf>) -> BatchConfig {
    BatchConfig {
        model_path: resolve_model_path(model),
        csv_path: args.input.clone(),
        output: OutputTarget::from_arg(&args.output),
        preview_rows: args.preview,
    }
}
