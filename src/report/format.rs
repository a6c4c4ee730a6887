//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the model / search code stays clean and testable
//! - output changes are localized

use crate::domain::{ArrheniusConfig, FitConfig, FitOutcome, InitialConcentrations, InputMode, RateLaw, Species};
use crate::io::ingest::IngestedSeries;
use crate::report::{PointRow, largest_residuals};

/// Format the run summary for `kfit fit` / `kfit order`.
pub fn format_run_summary(ingest: &IngestedSeries, outcome: &FitOutcome, config: &FitConfig) -> String {
    let mut out = String::new();

    out.push_str("=== kfit - batch reactor kinetics ===\n");
    out.push_str(&format!("Model: {}\n", config.model.display_name()));
    if config.model.uses_mode() {
        out.push_str(&format!("Mode: {}\n", config.mode));
    }
    let initial = format_initial(config.model, config.mode, &config.initial);
    if !initial.is_empty() {
        out.push_str(&format!("Initial: {initial}\n"));
    }
    out.push_str(&format_ingest(ingest));

    out.push_str("\nResult:\n");
    out.push_str(&format_outcome(outcome));
    out.push_str(&format!("Tuple: {}\n", fmt_vec(&outcome.to_tuple())));

    out
}

/// Format the run summary for `kfit arrhenius`.
pub fn format_arrhenius_summary(ingest: &IngestedSeries, outcome: &FitOutcome, config: &ArrheniusConfig) -> String {
    let mut out = String::new();

    out.push_str("=== kfit - Arrhenius fit ===\n");
    out.push_str(&format!(
        "Columns: k=`{}` T=`{}`\n",
        config.k_column, config.temperature_column
    ));
    out.push_str(&format_ingest(ingest));

    out.push_str("\nResult:\n");
    out.push_str(&format_outcome(outcome));
    out.push_str(&format!("Tuple: {}\n", fmt_vec(&outcome.to_tuple())));

    out
}

/// Result lines for any outcome kind.
pub fn format_outcome(outcome: &FitOutcome) -> String {
    let mut out = String::new();
    match outcome {
        FitOutcome::Single(f) => {
            out.push_str(&format!("- k   = {}\n", fmt_sci(f.k)));
            out.push_str(&format!("- R²  = {:.6}\n", f.rsq));
            out.push_str(&format!("- line: y' = {} x' + {}\n", fmt_sci(f.regression.slope), fmt_sci(f.regression.intercept)));
        }
        FitOutcome::Pair(f) => {
            out.push_str(&format!("- k1  = {}\n", fmt_sci(f.k1)));
            out.push_str(&format!("- k2  = {}\n", fmt_sci(f.k2)));
            out.push_str(&format!("- R²  = {:.6}\n", f.rsq));
            if let Some(secondary) = &f.secondary {
                out.push_str(&format!(
                    "- k1/k2 = {} (R² = {:.6})\n",
                    fmt_sci(secondary.slope),
                    secondary.rsq
                ));
            }
        }
        FitOutcome::Order(o) => {
            out.push_str(&format!("- n   = {:.2}\n", o.order));
            out.push_str(&format!("- k   = {}\n", fmt_sci(o.rate_constant)));
            out.push_str(&format!("- R²  = {:.6}\n", o.rsq));
            out.push_str(&format!(
                "- scanned {} candidate orders{}\n",
                o.candidates_evaluated,
                if o.early_stop { " (stopped early)" } else { "" }
            ));
        }
        FitOutcome::Arrhenius(a) => {
            out.push_str(&format!("- E/R = {} K\n", fmt_sci(a.e_over_r)));
            out.push_str(&format!("- Ea  = {:.3} kJ/mol\n", a.activation_energy / 1000.0));
            out.push_str(&format!("- A   = {}\n", fmt_sci(a.pre_exponential)));
            out.push_str(&format!("- R²  = {:.6}\n", a.rsq));
        }
    }
    out
}

/// Table of linearized points with fitted values and residuals.
pub fn format_points_table(rows: &[PointRow]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>5} {:>14} {:>14} {:>14} {:>14}",
            "#", "x'", "y'", "y_fit", "residual"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<5} {:-<14} {:-<14} {:-<14} {:-<14}", "", "", "", "", "").trim_end());
    out.push('\n');

    for (i, r) in rows.iter().enumerate() {
        out.push_str(
            format!(
                "{:>5} {:>14} {:>14} {:>14} {:>14}",
                i,
                fmt_sci(r.x),
                fmt_sci(r.y),
                fmt_sci(r.y_fit),
                fmt_sci(r.residual)
            )
            .trim_end(),
        );
        out.push('\n');
    }

    if let Some(&worst) = largest_residuals(rows, 1).first() {
        out.push_str(&format!(
            "Largest residual: #{worst} ({})\n",
            fmt_sci(rows[worst].residual)
        ));
    }

    out
}

fn format_ingest(ingest: &IngestedSeries) -> String {
    let mut out = format!(
        "Rows: read={} used={} skipped={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len()
    );
    for e in ingest.row_errors.iter().take(MAX_ROW_ERRORS) {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    if ingest.row_errors.len() > MAX_ROW_ERRORS {
        out.push_str(&format!("  ... {} more\n", ingest.row_errors.len() - MAX_ROW_ERRORS));
    }
    out
}

const MAX_ROW_ERRORS: usize = 5;

/// Only the initial concentrations the model actually reads.
fn format_initial(model: RateLaw, mode: InputMode, initial: &InitialConcentrations) -> String {
    let species = model.species();
    let mut parts = Vec::new();
    if model.reads_cao(mode) {
        parts.push(format!("Cao={}", initial.cao));
    }
    if species.contains(&Species::B) || model == RateLaw::SecondAB {
        parts.push(format!("Cbo={}", initial.cbo));
    }
    if species.contains(&Species::D) {
        parts.push(format!("Cdo={}", initial.cdo));
    }
    if model == RateLaw::Autocatalytic {
        parts.push(format!("Cro={}", initial.cro));
    }
    parts.join(" ")
}

fn fmt_sci(v: f64) -> String {
    format!("{v:.6e}")
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{KineticFit, Linearized, OrderSearchResult};
    use crate::math::RegressionResult;

    #[test]
    fn outcome_lines_name_every_constant() {
        let single = FitOutcome::Single(KineticFit {
            k: 0.25,
            rsq: 0.99,
            regression: RegressionResult {
                slope: 0.25,
                intercept: 0.0,
                rsq: 0.99,
            },
            linearized: Linearized::default(),
        });
        let text = format_outcome(&single);
        assert!(text.contains("k   = 2.500000e-1"));
        assert!(text.contains("R²  = 0.990000"));

        let order = FitOutcome::Order(OrderSearchResult {
            order: 1.5,
            rsq: 0.9995,
            rate_constant: 0.1,
            candidates_evaluated: 151,
            early_stop: true,
        });
        let text = format_outcome(&order);
        assert!(text.contains("n   = 1.50"));
        assert!(text.contains("stopped early"));
    }

    #[test]
    fn points_table_has_one_line_per_row() {
        let rows = vec![
            PointRow { x: 0.0, y: 1.0, y_fit: 1.0, residual: 0.0 },
            PointRow { x: 1.0, y: 2.5, y_fit: 2.0, residual: 0.5 },
        ];
        let table = format_points_table(&rows);
        assert_eq!(table.lines().count(), 2 + rows.len() + 1);
        assert!(table.contains("Largest residual: #1"));
        assert!(table.lines().all(|l| l == l.trim_end()));
    }

    #[test]
    fn initial_shows_only_relevant_species() {
        let c = InitialConcentrations {
            cao: 2.0,
            cbo: 3.0,
            cdo: 4.0,
            cro: 0.5,
        };
        let conc = InputMode::Concentration;
        assert_eq!(format_initial(RateLaw::SecondAB, conc, &c), "Cao=2 Cbo=3");
        assert_eq!(format_initial(RateLaw::ThirdABD, conc, &c), "Cao=2 Cbo=3 Cdo=4");
        assert_eq!(format_initial(RateLaw::Autocatalytic, conc, &c), "Cao=2 Cro=0.5");
        assert_eq!(format_initial(RateLaw::ShiftingOrder, conc, &c), "Cao=2");
        assert_eq!(format_initial(RateLaw::Parallel, conc, &c), "");
    }

    #[test]
    fn initial_hides_cao_when_the_fit_ignores_it() {
        let c = InitialConcentrations { cao: 2.0, ..Default::default() };
        for mode in [InputMode::Concentration, InputMode::Conversion] {
            assert_eq!(format_initial(RateLaw::First, mode, &c), "");
        }
        for model in [RateLaw::Zeroth, RateLaw::Second2A, RateLaw::NthOrder] {
            assert_eq!(format_initial(model, InputMode::Concentration, &c), "");
            assert_eq!(format_initial(model, InputMode::Conversion, &c), "Cao=2");
        }
    }
}
