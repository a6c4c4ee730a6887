//! Third-order (trimolecular) irreversible reactions.
//!
//! All three forms work on concentrations; conversion inputs are mapped with
//! `Ci = Cio(1 - Xi)` per species.

use crate::domain::{InputMode, KineticFit, Linearized};
use crate::error::{KineticsError, KineticsResult};
use crate::math::{ensure_positive, ensure_same_len, map_finite, map_indexed_finite, ratio_is, to_concentration};

use super::fit_single;

/// `A + B + D → R`, `-rA = k·Ca·Cb·Cd`, all initial concentrations distinct.
///
/// Partial fractions give
///
/// ```text
/// ln Ca/((Cao-Cbo)(Cao-Cdo)) + ln Cb/((Cbo-Cdo)(Cbo-Cao)) + ln Cd/((Cdo-Cao)(Cdo-Cbo)) = -k·t + const
/// ```
#[allow(clippy::too_many_arguments)]
pub fn third_order_abd(
    time: &[f64],
    a: &[f64],
    b: &[f64],
    d: &[f64],
    mode: InputMode,
    cao: f64,
    cbo: f64,
    cdo: f64,
) -> KineticsResult<KineticFit> {
    ensure_same_len(time, a)?;
    ensure_same_len(time, b)?;
    ensure_same_len(time, d)?;
    ensure_positive("cao", cao)?;
    ensure_positive("cbo", cbo)?;
    ensure_positive("cdo", cdo)?;

    if ratio_is(cao, cbo) || ratio_is(cao, cdo) || ratio_is(cbo, cdo) {
        return Err(KineticsError::SingularStoichiometry(format!(
            "A + B + D needs distinct initial concentrations (cao={cao}, cbo={cbo}, cdo={cdo})"
        )));
    }

    let first = 1.0 / ((cao - cbo) * (cao - cdo));
    let second = 1.0 / ((cbo - cdo) * (cbo - cao));
    let third = 1.0 / ((cdo - cao) * (cdo - cbo));

    let ca = to_concentration(a, mode, cao);
    let cb = to_concentration(b, mode, cbo);
    let cd = to_concentration(d, mode, cdo);

    let y = map_indexed_finite(time.len(), |i| {
        first * ca[i].ln() + second * cb[i].ln() + third * cd[i].ln()
    })?;
    fit_single(Linearized::new(time.to_vec(), y), |r| -r.slope)
}

/// `A + 2B → R`, `-rA = k·Ca·Cb²`, with `M = Cbo/Cao`.
///
/// - `M = 2`: `Cb = 2Ca` throughout, so `1/Ca² = 8k·t + const`.
/// - otherwise: `(2Cao-Cbo)(Cbo-Cb)/(Cbo·Cb) + ln(Cao·Cb/(Cbo·Ca)) = (2Cao-Cbo)²·k·t`.
pub fn third_order_a2b(
    time: &[f64],
    a: &[f64],
    b: &[f64],
    mode: InputMode,
    cao: f64,
    cbo: f64,
) -> KineticsResult<KineticFit> {
    ensure_same_len(time, a)?;
    ensure_same_len(time, b)?;
    ensure_positive("cao", cao)?;
    ensure_positive("cbo", cbo)?;

    let m = cbo / cao;
    let ca = to_concentration(a, mode, cao);
    let cb = to_concentration(b, mode, cbo);

    if ratio_is(m, 2.0) {
        let y = map_finite(&ca, |c| 1.0 / (c * c))?;
        return fit_single(Linearized::new(time.to_vec(), y), |r| r.slope / 8.0);
    }

    let delta = 2.0 * cao - cbo;
    let y = unequal_pair_series(&ca, &cb, cao, cbo, delta)?;
    fit_single(Linearized::new(time.to_vec(), y), |r| r.slope / (delta * delta))
}

/// `A + B → R` with `-rA = k·Ca·Cb²` and `M = Cbo/Cao`.
///
/// - `M = 1`: `Ca = Cb`, so `1/Ca² = 2k·t + const`.
/// - otherwise: `(Cao-Cbo)(Cbo-Cb)/(Cbo·Cb) + ln(Cao·Cb/(Cbo·Ca)) = (Cao-Cbo)²·k·t`.
pub fn third_order_ab(
    time: &[f64],
    a: &[f64],
    b: &[f64],
    mode: InputMode,
    cao: f64,
    cbo: f64,
) -> KineticsResult<KineticFit> {
    ensure_same_len(time, a)?;
    ensure_same_len(time, b)?;
    ensure_positive("cao", cao)?;
    ensure_positive("cbo", cbo)?;

    let m = cbo / cao;
    let ca = to_concentration(a, mode, cao);
    let cb = to_concentration(b, mode, cbo);

    if ratio_is(m, 1.0) {
        let y = map_finite(&ca, |c| 1.0 / (c * c))?;
        return fit_single(Linearized::new(time.to_vec(), y), |r| r.slope / 2.0);
    }

    let delta = cao - cbo;
    let y = unequal_pair_series(&ca, &cb, cao, cbo, delta)?;
    fit_single(Linearized::new(time.to_vec(), y), |r| r.slope / (delta * delta))
}

/// `delta·(Cbo - Cb)/(Cbo·Cb) + ln(Cao·Cb/(Cbo·Ca))`, shared by both non-special branches.
fn unequal_pair_series(ca: &[f64], cb: &[f64], cao: f64, cbo: f64, delta: f64) -> KineticsResult<Vec<f64>> {
    let first = delta / cbo;
    map_indexed_finite(ca.len(), |i| {
        first * (cbo - cb[i]) / cb[i] + ((cao * cb[i]) / (cbo * ca[i])).ln()
    })
}
