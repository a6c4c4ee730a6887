//! Sample-series helpers shared by the kinetic models.
//!
//! Batch-reactor relations used throughout:
//!
//! - `C = C0 * (1 - X)`
//! - `X = 1 - C / C0`
//!
//! Transforms that can blow up (`ln 0`, `1 / 0`) go through [`map_finite`], which
//! reports the first offending sample index instead of handing NaN/∞ to the
//! regressor.

use crate::domain::InputMode;
use crate::error::{KineticsError, KineticsResult};

/// Express `values` as concentrations, whatever `mode` they were measured in.
pub fn to_concentration(values: &[f64], mode: InputMode, c0: f64) -> Vec<f64> {
    match mode {
        InputMode::Concentration => values.to_vec(),
        InputMode::Conversion => values.iter().map(|x| c0 * (1.0 - x)).collect(),
    }
}

/// Express `values` as fractional conversions, whatever `mode` they were measured in.
pub fn to_conversion(values: &[f64], mode: InputMode, c0: f64) -> Vec<f64> {
    match mode {
        InputMode::Conversion => values.to_vec(),
        InputMode::Concentration => values.iter().map(|c| 1.0 - c / c0).collect(),
    }
}

/// Apply `f` to every sample, failing on the first non-finite output.
pub fn map_finite<F>(values: &[f64], f: F) -> KineticsResult<Vec<f64>>
where
    F: Fn(f64) -> f64,
{
    values
        .iter()
        .enumerate()
        .map(|(index, &v)| {
            let out = f(v);
            if out.is_finite() {
                Ok(out)
            } else {
                Err(KineticsError::NonFiniteTransform { index })
            }
        })
        .collect()
}

/// Like [`map_finite`], for transforms that combine several aligned series.
pub fn map_indexed_finite<F>(len: usize, f: F) -> KineticsResult<Vec<f64>>
where
    F: Fn(usize) -> f64,
{
    (0..len)
        .map(|index| {
            let out = f(index);
            if out.is_finite() {
                Ok(out)
            } else {
                Err(KineticsError::NonFiniteTransform { index })
            }
        })
        .collect()
}

/// Require `series` to have the same length as the time axis.
pub fn ensure_same_len(time: &[f64], series: &[f64]) -> KineticsResult<()> {
    if time.len() != series.len() {
        return Err(KineticsError::LengthMismatch {
            expected: time.len(),
            found: series.len(),
        });
    }
    Ok(())
}

/// Initial concentrations and temperatures must be finite and strictly positive.
pub fn ensure_positive(name: &'static str, value: f64) -> KineticsResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(KineticsError::InvalidParameter { name, value })
    }
}

/// `true` if `m` is within a relative tolerance of `target`.
///
/// Used to route stoichiometric ratios onto their special-case formulas.
pub fn ratio_is(m: f64, target: f64) -> bool {
    (m - target).abs() <= 1e-9 * target.abs().max(1.0)
}
