//! Shared fit pipeline used by every front-end command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> model dispatch (or order search) -> outcome -> report rows
//!
//! The command handlers in `app` then focus on presentation (printing + exports).

use clap::ValueEnum;
use log::{debug, info};

use crate::data::{SampleData, generate_sample};
use crate::domain::{
    ArrheniusConfig, FitConfig, FitOutcome, InitialConcentrations, RateLaw, ResultFile, SimulationConfig, Species,
};
use crate::error::AppError;
use crate::fit::{OrderSearchOptions, search_order_with};
use crate::io::ingest::{IngestedSeries, load_arrhenius_series, load_fit_series};
use crate::models;
use crate::report::{PointRow, compute_point_rows};

/// All computed outputs of a single fit run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedSeries,
    pub outcome: FitOutcome,
    /// Linearized points against the fitted line (empty for order searches).
    pub rows: Vec<PointRow>,
}

/// Execute `kfit fit` / `kfit order`: load the CSV and fit `config.model`.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let ingest = load_fit_series(config)?;
    info!(
        "loaded {} rows from '{}' ({} skipped)",
        ingest.rows_used,
        config.csv_path.display(),
        ingest.row_errors.len()
    );

    let outcome = fit_series(config, &ingest)?;
    finish(ingest, outcome)
}

/// Execute `kfit arrhenius`.
pub fn run_arrhenius(config: &ArrheniusConfig) -> Result<RunOutput, AppError> {
    let ingest = load_arrhenius_series(config)?;
    let k = ingest.require(&config.k_column)?;
    let temperature = ingest.require(&config.temperature_column)?;

    let fit = models::arrhenius(k, temperature)?;
    info!("arrhenius: E/R={:.6e} R²={:.6}", fit.e_over_r, fit.rsq);
    finish(ingest, FitOutcome::Arrhenius(fit))
}

/// Execute `kfit simulate`.
pub fn run_simulation(config: &SimulationConfig) -> Result<SampleData, AppError> {
    let sample = generate_sample(config)?;
    debug!(
        "simulated {} ({} columns, seed {})",
        config.model.display_name(),
        sample.columns.len(),
        config.seed
    );
    Ok(sample)
}

/// Dispatch the loaded series to the model named by `config.model`.
pub fn fit_series(config: &FitConfig, ingest: &IngestedSeries) -> Result<FitOutcome, AppError> {
    let time = ingest.require(&config.columns.time)?;
    let series = |s: Species| ingest.require(config.columns.for_species(s));
    let InitialConcentrations { cao, cbo, cdo, cro } = config.initial;
    let mode = config.mode;

    debug!("fitting {} in {mode} mode", config.model.display_name());
    let outcome = match config.model {
        RateLaw::Zeroth => FitOutcome::Single(models::zeroth_order(time, series(Species::A)?, mode, cao)?),
        RateLaw::First => FitOutcome::Single(models::first_order(time, series(Species::A)?, mode)?),
        RateLaw::Second2A => FitOutcome::Single(models::second_order_2a(time, series(Species::A)?, mode, cao)?),
        RateLaw::SecondAB => FitOutcome::Single(models::second_order_ab(time, series(Species::A)?, mode, cao, cbo)?),
        RateLaw::ThirdABD => FitOutcome::Single(models::third_order_abd(
            time,
            series(Species::A)?,
            series(Species::B)?,
            series(Species::D)?,
            mode,
            cao,
            cbo,
            cdo,
        )?),
        RateLaw::ThirdA2B => FitOutcome::Single(models::third_order_a2b(
            time,
            series(Species::A)?,
            series(Species::B)?,
            mode,
            cao,
            cbo,
        )?),
        RateLaw::ThirdAB => FitOutcome::Single(models::third_order_ab(
            time,
            series(Species::A)?,
            series(Species::B)?,
            mode,
            cao,
            cbo,
        )?),
        RateLaw::Autocatalytic => {
            FitOutcome::Single(models::autocatalytic(time, series(Species::A)?, mode, cao, cro)?)
        }
        RateLaw::Parallel => FitOutcome::Pair(models::parallel_reactions(
            time,
            series(Species::A)?,
            series(Species::R)?,
            series(Species::S)?,
        )?),
        RateLaw::ShiftingOrder => FitOutcome::Pair(models::shifting_order(time, series(Species::A)?, mode, cao)?),
        RateLaw::NthOrder => FitOutcome::Order(search_order_with(
            time,
            series(Species::A)?,
            mode,
            cao,
            &search_options(config),
        )?),
    };

    Ok(outcome)
}

/// Order-search options carried by a fit config.
pub fn search_options(config: &FitConfig) -> OrderSearchOptions {
    OrderSearchOptions {
        early_stop_rsq: config.early_stop_rsq,
        parallel: config.parallel,
    }
}

/// The JSON export for a fit run.
pub fn result_file(config: &FitConfig, outcome: &FitOutcome) -> ResultFile {
    let model = config
        .model
        .to_possible_value()
        .map_or_else(|| format!("{:?}", config.model), |v| v.get_name().to_string());
    ResultFile {
        tool: "kfit".to_string(),
        model,
        mode: config.model.uses_mode().then_some(config.mode),
        initial: (config.model != RateLaw::Parallel).then_some(config.initial),
        outcome: outcome.clone(),
        tuple: outcome.to_tuple(),
    }
}

/// The JSON export for an Arrhenius run.
pub fn arrhenius_result_file(outcome: &FitOutcome) -> ResultFile {
    ResultFile {
        tool: "kfit".to_string(),
        model: "arrhenius".to_string(),
        mode: None,
        initial: None,
        outcome: outcome.clone(),
        tuple: outcome.to_tuple(),
    }
}

fn finish(ingest: IngestedSeries, outcome: FitOutcome) -> Result<RunOutput, AppError> {
    let rows = match outcome.linearized() {
        Some((linearized, line)) => compute_point_rows(linearized, line)?,
        None => Vec::new(),
    };
    Ok(RunOutput { ingest, outcome, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColumnNames, InputMode};
    use crate::io::export::write_sample_file;
    use approx::assert_relative_eq;
    use std::path::Path;
    use tempfile::tempdir;

    fn simulate_to(path: &Path, model: RateLaw, mode: InputMode, initial: InitialConcentrations) {
        let sample = run_simulation(&SimulationConfig {
            model,
            mode,
            initial,
            k: 0.3,
            k2: 0.1,
            order: 2.0,
            t_max: 10.0,
            points: 21,
            noise: 0.0,
            seed: 7,
            output: None,
        })
        .unwrap();
        write_sample_file(path, &sample).unwrap();
    }

    fn fit_config(path: &Path, model: RateLaw, mode: InputMode, initial: InitialConcentrations) -> FitConfig {
        FitConfig {
            csv_path: path.to_path_buf(),
            model,
            mode,
            initial,
            columns: ColumnNames::default(),
            early_stop_rsq: None,
            parallel: false,
            show_points: false,
            export_json: None,
            export_linearized: None,
        }
    }

    #[test]
    fn simulate_then_fit_recovers_k_for_single_constant_models() {
        let dir = tempdir().unwrap();
        let initial = InitialConcentrations {
            cao: 2.0,
            cbo: 3.0,
            cdo: 4.0,
            cro: 0.5,
        };
        let models = [
            RateLaw::Zeroth,
            RateLaw::First,
            RateLaw::Second2A,
            RateLaw::SecondAB,
            RateLaw::Autocatalytic,
        ];
        for model in models {
            for mode in [InputMode::Concentration, InputMode::Conversion] {
                let path = dir.path().join(format!("{model:?}-{mode}.csv"));
                // Zeroth order at k = 0.3 would run A out before t = 10.
                let initial = if model == RateLaw::Zeroth {
                    InitialConcentrations { cao: 5.0, ..initial }
                } else {
                    initial
                };
                simulate_to(&path, model, mode, initial);

                let run = run_fit(&fit_config(&path, model, mode, initial)).unwrap();
                let FitOutcome::Single(fit) = &run.outcome else { panic!("expected single-constant outcome") };
                assert_relative_eq!(fit.k, 0.3, max_relative = 1e-6);
                assert_eq!(run.rows.len(), 21);
            }
        }
    }

    #[test]
    fn parallel_run_reads_product_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("parallel.csv");
        let initial = InitialConcentrations::default();
        simulate_to(&path, RateLaw::Parallel, InputMode::Concentration, initial);

        let run = run_fit(&fit_config(&path, RateLaw::Parallel, InputMode::Concentration, initial)).unwrap();
        let FitOutcome::Pair(fit) = &run.outcome else { panic!("expected two-constant outcome") };
        assert_relative_eq!(fit.k1, 0.3, max_relative = 1e-6);
        assert_relative_eq!(fit.k2, 0.1, max_relative = 1e-6);
    }

    #[test]
    fn nth_order_run_uses_the_order_search() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nth.csv");
        let initial = InitialConcentrations { cao: 5.0, ..Default::default() };
        simulate_to(&path, RateLaw::NthOrder, InputMode::Concentration, initial);

        let run = run_fit(&fit_config(&path, RateLaw::NthOrder, InputMode::Concentration, initial)).unwrap();
        let FitOutcome::Order(best) = run.outcome else { panic!("expected order outcome") };
        assert!((best.order - 2.0).abs() < 1e-12);
        assert_relative_eq!(best.rate_constant, 0.3, max_relative = 1e-6);
        assert!(run.rows.is_empty());
    }

    #[test]
    fn missing_species_column_is_a_schema_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("first.csv");
        let initial = InitialConcentrations::default();
        simulate_to(&path, RateLaw::First, InputMode::Concentration, initial);

        let err = run_fit(&fit_config(&path, RateLaw::ThirdAB, InputMode::Concentration, initial)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn result_file_omits_unused_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("p.csv");
        let config = fit_config(&path, RateLaw::Parallel, InputMode::Conversion, InitialConcentrations::default());
        let outcome = FitOutcome::Order(crate::domain::OrderSearchResult {
            order: 2.0,
            rsq: 1.0,
            rate_constant: 0.3,
            candidates_evaluated: 200,
            early_stop: true,
        });
        let file = result_file(&config, &outcome);
        assert_eq!(file.model, "parallel");
        assert!(file.mode.is_none());
        assert!(file.initial.is_none());
        assert_eq!(file.tuple, vec![2.0, 1.0, 0.3]);

        let config = fit_config(&path, RateLaw::SecondAB, InputMode::Conversion, InitialConcentrations::default());
        assert_eq!(result_file(&config, &outcome).model, "second-ab");
    }
}
