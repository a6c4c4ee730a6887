//! Command-line parsing for the batch-reactor kinetics fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{InputMode, RateLaw};
use crate::fit::DEFAULT_EARLY_STOP_RSQ;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "kfit", version, about = "Batch-reactor kinetic parameter estimation")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a rate law to time-series data from a CSV file.
    Fit(FitArgs),
    /// Search the reaction order of `-rA = k·Ca^n`.
    Order(OrderArgs),
    /// Fit `ln k` against `1/T` for rate constants measured at several temperatures.
    Arrhenius(ArrheniusArgs),
    /// Generate a synthetic dataset for a rate law.
    Simulate(SimulateArgs),
}

/// Options for `kfit fit`.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Input CSV (header row, numeric columns).
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,

    /// Rate law to fit.
    #[arg(short, long, value_enum)]
    pub model: RateLaw,

    /// How the species columns are expressed.
    #[arg(long, value_enum, default_value_t = InputMode::Concentration)]
    pub mode: InputMode,

    #[command(flatten)]
    pub initial: InitialArgs,

    #[command(flatten)]
    pub columns: ColumnArgs,

    #[command(flatten)]
    pub search: SearchArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Export linearized points (`x,y,y_fit,residual`) to CSV.
    #[arg(long = "export-linearized", value_name = "CSV")]
    pub export_linearized: Option<PathBuf>,
}

/// Options for `kfit order`.
#[derive(Debug, Parser, Clone)]
pub struct OrderArgs {
    /// Input CSV (header row, numeric columns).
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,

    /// How the species column is expressed.
    #[arg(long, value_enum, default_value_t = InputMode::Concentration)]
    pub mode: InputMode,

    #[command(flatten)]
    pub initial: InitialArgs,

    #[command(flatten)]
    pub columns: ColumnArgs,

    #[command(flatten)]
    pub search: SearchArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Options for `kfit arrhenius`.
#[derive(Debug, Parser, Clone)]
pub struct ArrheniusArgs {
    /// Input CSV with one rate constant and one absolute temperature per row.
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,

    /// Rate-constant column.
    #[arg(long = "k-col", default_value = "k")]
    pub k_col: String,

    /// Temperature column (K).
    #[arg(long = "temp-col", default_value = "T")]
    pub temp_col: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Options for `kfit simulate`.
#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Rate law to simulate.
    #[arg(short, long, value_enum)]
    pub model: RateLaw,

    /// How the species columns are written.
    #[arg(long, value_enum, default_value_t = InputMode::Concentration)]
    pub mode: InputMode,

    #[command(flatten)]
    pub initial: InitialArgs,

    /// Rate constant (`k1` for parallel / shifting order).
    #[arg(long)]
    pub k: f64,

    /// Second rate constant for parallel / shifting order.
    #[arg(long, default_value_t = 0.1)]
    pub k2: f64,

    /// Reaction order for `nth-order`.
    #[arg(long, default_value_t = 2.0)]
    pub order: f64,

    /// Last sampling time.
    #[arg(long, default_value_t = 10.0)]
    pub t_max: f64,

    /// Number of samples (including t = 0).
    #[arg(long, default_value_t = 21)]
    pub points: usize,

    /// Relative Gaussian noise on every observed value.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Random seed for the noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV (stdout if omitted).
    #[arg(short, long, value_name = "CSV")]
    pub output: Option<PathBuf>,
}

/// Initial concentrations.
#[derive(Debug, Args, Clone, Copy)]
pub struct InitialArgs {
    /// Initial concentration of A.
    #[arg(long, default_value_t = 1.0)]
    pub cao: f64,

    /// Initial concentration of B.
    #[arg(long, default_value_t = 1.0)]
    pub cbo: f64,

    /// Initial concentration of D.
    #[arg(long, default_value_t = 1.0)]
    pub cdo: f64,

    /// Initial concentration of R (autocatalytic).
    #[arg(long, default_value_t = 1.0)]
    pub cro: f64,
}

/// CSV column names.
#[derive(Debug, Args, Clone)]
pub struct ColumnArgs {
    #[arg(long = "time-col", default_value = "t")]
    pub time_col: String,

    #[arg(long = "a-col", default_value = "a")]
    pub a_col: String,

    #[arg(long = "b-col", default_value = "b")]
    pub b_col: String,

    #[arg(long = "d-col", default_value = "d")]
    pub d_col: String,

    #[arg(long = "r-col", default_value = "r")]
    pub r_col: String,

    #[arg(long = "s-col", default_value = "s")]
    pub s_col: String,
}

/// Order-search tuning (used by `nth-order` fits and `kfit order`).
#[derive(Debug, Args, Clone, Copy)]
pub struct SearchArgs {
    /// Stop the order scan at the first candidate with R² above this value.
    #[arg(long = "early-stop", value_name = "RSQ", default_value_t = DEFAULT_EARLY_STOP_RSQ)]
    pub early_stop: f64,

    /// Scan every candidate order.
    #[arg(long = "no-early-stop", conflicts_with = "early_stop")]
    pub no_early_stop: bool,

    /// Evaluate candidate orders in parallel.
    #[arg(long)]
    pub parallel: bool,
}

/// Report / export options shared by the fitting commands.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Print the linearized points table.
    #[arg(long)]
    pub points: bool,

    /// Export the result to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}
