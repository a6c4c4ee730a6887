//! Arrhenius temperature dependence, `k = A·exp(-E/(R·T))`.
//!
//! `ln k` is linear in `1/T` with slope `-E/R` and intercept `ln A`.

use crate::domain::{ArrheniusFit, Linearized};
use crate::error::{KineticsError, KineticsResult};
use crate::math::{ensure_same_len, map_finite, try_fit};

/// Molar gas constant, J/(mol·K).
pub const GAS_CONSTANT: f64 = 8.314_462_618;

/// Fit `ln k` against `1/T` for paired rate-constant / temperature observations.
///
/// Temperatures are absolute (K) and must be strictly positive.
pub fn arrhenius(rate_constants: &[f64], temperatures: &[f64]) -> KineticsResult<ArrheniusFit> {
    ensure_same_len(temperatures, rate_constants)?;
    if let Some(&bad) = temperatures.iter().find(|t| !(t.is_finite() && **t > 0.0)) {
        return Err(KineticsError::InvalidParameter {
            name: "temperature",
            value: bad,
        });
    }

    let x = map_finite(temperatures, |t| 1.0 / t)?;
    let y = map_finite(rate_constants, f64::ln)?;
    let linearized = Linearized::new(x, y);
    let regression = try_fit(&linearized.x, &linearized.y)?;

    let e_over_r = -regression.slope;
    Ok(ArrheniusFit {
        e_over_r,
        rsq: regression.rsq,
        pre_exponential: regression.intercept.exp(),
        activation_energy: e_over_r * GAS_CONSTANT,
        regression,
        linearized,
    })
}
