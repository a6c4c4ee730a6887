//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - initialises terminal logging
//! - runs fits, order searches, Arrhenius fits and simulations
//! - prints reports
//! - writes optional exports

use std::io;

use clap::Parser;
use log::{info, warn};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use crate::cli::{ArrheniusArgs, ColumnArgs, Command, FitArgs, InitialArgs, OrderArgs, SearchArgs, SimulateArgs};
use crate::domain::{ArrheniusConfig, ColumnNames, FitConfig, InitialConcentrations, RateLaw, SimulationConfig};
use crate::error::AppError;
use crate::report::{format_arrhenius_summary, format_points_table, format_run_summary};

pub mod pipeline;

/// Entry point for the `kfit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(fit_config_from_args(&args)?),
        Command::Order(args) => handle_fit(order_config_from_args(&args)?),
        Command::Arrhenius(args) => handle_arrhenius(arrhenius_config_from_args(&args)),
        Command::Simulate(args) => handle_simulate(simulation_config_from_args(&args)),
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // Only the first logger wins; a second init (e.g. embedding) keeps it.
    if TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto).is_err() {
        warn!("logger already initialised");
    }
}

fn handle_fit(config: FitConfig) -> Result<(), AppError> {
    let run = pipeline::run_fit(&config)?;

    println!("{}", format_run_summary(&run.ingest, &run.outcome, &config));
    if config.show_points && !run.rows.is_empty() {
        println!("{}", format_points_table(&run.rows));
    }

    if let Some(path) = &config.export_json {
        crate::io::export::write_result_json(path, &pipeline::result_file(&config, &run.outcome))?;
        info!("wrote result JSON to '{}'", path.display());
    }
    if let Some(path) = &config.export_linearized {
        if run.rows.is_empty() {
            warn!("order search results carry no linearized points; skipping '{}'", path.display());
        } else {
            crate::io::export::write_linearized_csv(path, &run.rows)?;
            info!("wrote linearized points to '{}'", path.display());
        }
    }

    Ok(())
}

fn handle_arrhenius(config: ArrheniusConfig) -> Result<(), AppError> {
    let run = pipeline::run_arrhenius(&config)?;

    println!("{}", format_arrhenius_summary(&run.ingest, &run.outcome, &config));
    if config.show_points {
        println!("{}", format_points_table(&run.rows));
    }

    if let Some(path) = &config.export_json {
        crate::io::export::write_result_json(path, &pipeline::arrhenius_result_file(&run.outcome))?;
        info!("wrote result JSON to '{}'", path.display());
    }

    Ok(())
}

fn handle_simulate(config: SimulationConfig) -> Result<(), AppError> {
    let sample = pipeline::run_simulation(&config)?;

    match &config.output {
        Some(path) => {
            crate::io::export::write_sample_file(path, &sample)?;
            info!("wrote {} samples to '{}'", config.points, path.display());
        }
        None => crate::io::export::write_sample_csv(io::stdout().lock(), &sample)?,
    }
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig, AppError> {
    let search = search_from_args(&args.search)?;
    Ok(FitConfig {
        csv_path: args.csv.clone(),
        model: args.model,
        mode: args.mode,
        initial: initial_from_args(&args.initial),
        columns: columns_from_args(&args.columns),
        early_stop_rsq: search.0,
        parallel: search.1,
        show_points: args.output.points,
        export_json: args.output.export_json.clone(),
        export_linearized: args.export_linearized.clone(),
    })
}

pub fn order_config_from_args(args: &OrderArgs) -> Result<FitConfig, AppError> {
    let search = search_from_args(&args.search)?;
    Ok(FitConfig {
        csv_path: args.csv.clone(),
        model: RateLaw::NthOrder,
        mode: args.mode,
        initial: initial_from_args(&args.initial),
        columns: columns_from_args(&args.columns),
        early_stop_rsq: search.0,
        parallel: search.1,
        show_points: args.output.points,
        export_json: args.output.export_json.clone(),
        export_linearized: None,
    })
}

pub fn arrhenius_config_from_args(args: &ArrheniusArgs) -> ArrheniusConfig {
    ArrheniusConfig {
        csv_path: args.csv.clone(),
        k_column: args.k_col.clone(),
        temperature_column: args.temp_col.clone(),
        show_points: args.output.points,
        export_json: args.output.export_json.clone(),
    }
}

pub fn simulation_config_from_args(args: &SimulateArgs) -> SimulationConfig {
    SimulationConfig {
        model: args.model,
        mode: args.mode,
        initial: initial_from_args(&args.initial),
        k: args.k,
        k2: args.k2,
        order: args.order,
        t_max: args.t_max,
        points: args.points,
        noise: args.noise,
        seed: args.seed,
        output: args.output.clone(),
    }
}

fn initial_from_args(args: &InitialArgs) -> InitialConcentrations {
    InitialConcentrations {
        cao: args.cao,
        cbo: args.cbo,
        cdo: args.cdo,
        cro: args.cro,
    }
}

fn columns_from_args(args: &ColumnArgs) -> ColumnNames {
    ColumnNames {
        time: args.time_col.clone(),
        a: args.a_col.clone(),
        b: args.b_col.clone(),
        d: args.d_col.clone(),
        r: args.r_col.clone(),
        s: args.s_col.clone(),
    }
}

/// `(early_stop_rsq, parallel)` after validating the threshold.
fn search_from_args(args: &SearchArgs) -> Result<(Option<f64>, bool), AppError> {
    if args.no_early_stop {
        return Ok((None, args.parallel));
    }
    if !(args.early_stop.is_finite() && args.early_stop > 0.0 && args.early_stop <= 1.0) {
        return Err(AppError::new(
            2,
            format!("Invalid --early-stop {} (must be in (0, 1]).", args.early_stop),
        ));
    }
    Ok((Some(args.early_stop), args.parallel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    #[test]
    fn order_command_builds_an_nth_order_config() {
        let cli = Cli::parse_from(["kfit", "order", "--csv", "x.csv", "--cao", "5", "--no-early-stop", "--parallel"]);
        let Command::Order(args) = cli.command else { panic!("expected order") };
        let config = order_config_from_args(&args).unwrap();
        assert_eq!(config.model, RateLaw::NthOrder);
        assert_eq!(config.initial.cao, 5.0);
        assert_eq!(config.early_stop_rsq, None);
        assert!(config.parallel);
    }

    #[test]
    fn fit_command_keeps_the_default_threshold() {
        let cli = Cli::parse_from(["kfit", "fit", "--csv", "x.csv", "--model", "nth-order", "--a-col", "CA"]);
        let Command::Fit(args) = cli.command else { panic!("expected fit") };
        let config = fit_config_from_args(&args).unwrap();
        assert_eq!(config.early_stop_rsq, Some(crate::fit::DEFAULT_EARLY_STOP_RSQ));
        assert_eq!(config.columns.a, "CA");
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let cli = Cli::parse_from(["kfit", "order", "--csv", "x.csv", "--early-stop", "1.5"]);
        let Command::Order(args) = cli.command else { panic!("expected order") };
        let err = order_config_from_args(&args).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
