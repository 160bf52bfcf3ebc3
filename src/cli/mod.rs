//! Command-line parsing for the sales forecaster.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! feature/prediction code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::config::DEFAULT_OUTPUT_PATH;
use crate::features::parse_date;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "salecast", version, about = "Sales quantity forecasts from lag features")]
pub struct Cli {
    /// Model artifact (JSON). Defaults to `$SALECAST_MODEL`, then `SalesModel.json`.
    #[arg(long, global = true, value_name = "JSON")]
    pub model: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict a single period from manually entered lag values.
    Predict(PredictArgs),
    /// Predict every row of a CSV sales history and export the results.
    Batch(BatchArgs),
    /// Print or export the model input built from a CSV sales history.
    Features(FeaturesArgs),
}

/// Options for a manual prediction.
#[derive(Debug, Parser, Clone)]
pub struct PredictArgs {
    /// Date to predict (defaults to today).
    #[arg(long, value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,

    /// Sales from the previous period.
    #[arg(long = "lag-1", default_value_t = 0.0, value_parser = parse_non_negative)]
    pub lag_1: f64,

    /// Sales from three periods ago.
    #[arg(long = "lag-3", default_value_t = 0.0, value_parser = parse_non_negative)]
    pub lag_3: f64,
}

/// Options for batch prediction.
#[derive(Debug, Parser, Clone)]
pub struct BatchArgs {
    /// CSV file with `date` and `quantity` columns.
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: PathBuf,

    /// Output CSV (`-` for stdout).
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: String,

    /// Number of raw rows to preview.
    #[arg(long, default_value_t = 5)]
    pub preview: usize,
}

/// Options for feature inspection.
#[derive(Debug, Parser, Clone)]
pub struct FeaturesArgs {
    /// CSV file with `date` and `quantity` columns.
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: PathBuf,

    /// Write features to CSV instead of printing a table (`-` for stdout).
    #[arg(short = 'o', long)]
    pub output: Option<String>,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("invalid date '{s}' (expected YYYY-MM-DD or MM/DD/YYYY)"))
}

fn parse_non_negative(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if v.is_finite() && v >= 0.0 {
        Ok(v)
    } else {
        Err(format!("'{s}' must be a non-negative number"))
    }
}
