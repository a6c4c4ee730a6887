//! Unknown-order grid search for `-dCa/dt = k·Ca^n`.
//!
//! For `n ≠ 1` the rate law integrates to
//!
//! ```text
//! Ca^(1-n) = Cao^(1-n) + (n - 1)·k·t
//! ```
//!
//! so for every candidate `n` we regress `Ca^(1-n)` against time and read
//! `k = slope / (n - 1)`.
//!
//! Selection walks the candidates in scan order:
//! - a candidate replaces the best if `k > 0` and its R² is strictly higher
//! - if that R² also exceeds the early-stop threshold, the scan ends there
//!
//! Candidates can be evaluated on the rayon pool. The selection is still a
//! sequential reduction over the ordered results, so the parallel scan returns
//! exactly what the sequential one does, including which candidate trips the
//! early stop.

use log::{debug, info, trace};
use rayon::prelude::*;

use crate::domain::{InputMode, OrderSearchResult};
use crate::error::{KineticsError, KineticsResult};
use crate::fit::order_grid::default_order_grid;
use crate::math::{ensure_positive, ensure_same_len, to_concentration, try_fit};

/// Default "good enough" R² that ends the scan.
pub const DEFAULT_EARLY_STOP_RSQ: f64 = 0.999;

/// Options for [`search_order_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderSearchOptions {
    /// Stop at the first accepted candidate whose R² exceeds this value.
    /// `None` scans the whole grid.
    pub early_stop_rsq: Option<f64>,
    /// Evaluate candidates in parallel.
    pub parallel: bool,
}

impl Default for OrderSearchOptions {
    fn default() -> Self {
        Self {
            early_stop_rsq: Some(DEFAULT_EARLY_STOP_RSQ),
            parallel: false,
        }
    }
}

/// One evaluated grid point.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    order: f64,
    rsq: f64,
    k: f64,
}

/// Search the reaction order with default options.
pub fn search_order(time: &[f64], values: &[f64], mode: InputMode, cao: f64) -> KineticsResult<OrderSearchResult> {
    search_order_with(time, values, mode, cao, &OrderSearchOptions::default())
}

/// Search the reaction order over the default grid.
///
/// Fails with `NoValidOrder` if no candidate yields a positive rate constant.
pub fn search_order_with(
    time: &[f64],
    values: &[f64],
    mode: InputMode,
    cao: f64,
    opts: &OrderSearchOptions,
) -> KineticsResult<OrderSearchResult> {
    ensure_same_len(time, values)?;
    if mode == InputMode::Conversion {
        ensure_positive("cao", cao)?;
    }

    let ca = to_concentration(values, mode, cao);
    let grid = default_order_grid();

    let result = if opts.parallel {
        let evaluated: Vec<Option<Candidate>> = grid
            .par_iter()
            .map(|&n| evaluate_candidate(n, time, &ca))
            .collect();
        select_best(evaluated.into_iter(), opts.early_stop_rsq)
    } else {
        select_best(grid.iter().map(|&n| evaluate_candidate(n, time, &ca)), opts.early_stop_rsq)
    };

    match result {
        Some(best) => {
            info!(
                "order search: n={:.2} k={:.6e} R²={:.6} after {} candidates{}",
                best.order,
                best.rate_constant,
                best.rsq,
                best.candidates_evaluated,
                if best.early_stop { " (early stop)" } else { "" }
            );
            Ok(best)
        }
        None => Err(KineticsError::NoValidOrder),
    }
}

/// Linearize and regress at order `n`. `None` if the candidate cannot be fitted.
fn evaluate_candidate(n: f64, time: &[f64], ca: &[f64]) -> Option<Candidate> {
    let exponent = 1.0 - n;
    let y: Vec<f64> = ca.iter().map(|c| c.powf(exponent)).collect();
    if y.iter().any(|v| !v.is_finite()) {
        trace!("n={n:.2}: non-finite Ca^(1-n), skipped");
        return None;
    }

    let fit = match try_fit(time, &y) {
        Ok(fit) => fit,
        Err(err) => {
            trace!("n={n:.2}: {err}");
            return None;
        }
    };
    let k = fit.slope / (n - 1.0);
    if !k.is_finite() {
        return None;
    }
    Some(Candidate {
        order: n,
        rsq: fit.rsq,
        k,
    })
}

/// Ordered reduction over evaluated candidates.
fn select_best<I>(candidates: I, early_stop_rsq: Option<f64>) -> Option<OrderSearchResult>
where
    I: Iterator<Item = Option<Candidate>>,
{
    let mut best: Option<OrderSearchResult> = None;
    let mut best_rsq = -1.0;
    let mut evaluated = 0usize;

    for candidate in candidates {
        evaluated += 1;
        let Some(c) = candidate else { continue };
        if !(c.k > 0.0 && c.rsq > best_rsq) {
            continue;
        }

        best_rsq = c.rsq;
        let early_stop = early_stop_rsq.is_some_and(|threshold| c.rsq > threshold);
        debug!("order search: new best n={:.2} R²={:.6} k={:.6e}", c.order, c.rsq, c.k);
        best = Some(OrderSearchResult {
            order: c.order,
            rsq: c.rsq,
            rate_constant: c.k,
            candidates_evaluated: 0,
            early_stop,
        });
        if early_stop {
            break;
        }
    }

    // Report how far the scan got, not where the best candidate sits.
    best.map(|b| OrderSearchResult {
        candidates_evaluated: evaluated,
        ..b
    })
}
