//! Single-reactant-series models: zeroth, first and second order, autocatalytic.
//!
//! | model          | y' (concentration)        | y' (conversion)              | k                 |
//! |----------------|---------------------------|------------------------------|-------------------|
//! | zeroth         | `Ca`                      | `Cao(1 - X)`                 | `-slope`          |
//! | first          | `-ln Ca`                  | `-ln(1 - X)`                 | `slope`           |
//! | second, 2A     | `1 / Ca`                  | `X / (1 - X)`                | `slope` / `slope/Cao` |
//! | second, A + B  | `ln((M - X)/(M(1 - X)))`  | same                         | `slope/(Cao(M-1))` |
//! | autocatalytic  | `ln((M + X)/(M(1 - X)))`  | same                         | `slope/(Cao+Cro)` |

use crate::domain::{InputMode, KineticFit, Linearized};
use crate::error::KineticsResult;
use crate::math::{ensure_positive, ensure_same_len, map_finite, ratio_is, to_concentration, to_conversion};

use super::fit_single;

/// Zeroth order, `-rA = k`.
///
/// Conversion data is first turned into concentration, so `k` has concentration/time
/// units in both modes.
pub fn zeroth_order(time: &[f64], values: &[f64], mode: InputMode, cao: f64) -> KineticsResult<KineticFit> {
    ensure_same_len(time, values)?;
    if mode == InputMode::Conversion {
        ensure_positive("cao", cao)?;
    }

    let ca = map_finite(&to_concentration(values, mode, cao), |c| c)?;
    fit_single(Linearized::new(time.to_vec(), ca), |r| -r.slope)
}

/// First order irreversible, `-rA = k·Ca`.
pub fn first_order(time: &[f64], values: &[f64], mode: InputMode) -> KineticsResult<KineticFit> {
    ensure_same_len(time, values)?;

    let y = match mode {
        InputMode::Concentration => map_finite(values, |c| -c.ln())?,
        // -ln(1 - X), via ln_1p for small conversions.
        InputMode::Conversion => map_finite(values, |x| -(-x).ln_1p())?,
    };
    fit_single(Linearized::new(time.to_vec(), y), |r| r.slope)
}

/// Second order bimolecular, `2A → R`, `-rA = k·Ca²`.
pub fn second_order_2a(time: &[f64], values: &[f64], mode: InputMode, cao: f64) -> KineticsResult<KineticFit> {
    ensure_same_len(time, values)?;

    match mode {
        InputMode::Concentration => {
            let y = map_finite(values, |c| 1.0 / c)?;
            fit_single(Linearized::new(time.to_vec(), y), |r| r.slope)
        }
        InputMode::Conversion => {
            ensure_positive("cao", cao)?;
            let y = map_finite(values, |x| x / (1.0 - x))?;
            fit_single(Linearized::new(time.to_vec(), y), |r| r.slope / cao)
        }
    }
}

/// Second order bimolecular, `A + B → R`, `-rA = k·Ca·Cb`, with `M = Cbo/Cao`.
///
/// For `M ≠ 1` the integrated form is `ln((M - X)/(M(1 - X))) = Cao(M - 1)·k·t`.
/// At `M = 1` that collapses to `0 = 0`, and the equimolar form
/// `X/(1 - X) = Cao·k·t` is used instead (its limit as `M → 1`).
pub fn second_order_ab(
    time: &[f64],
    values: &[f64],
    mode: InputMode,
    cao: f64,
    cbo: f64,
) -> KineticsResult<KineticFit> {
    ensure_same_len(time, values)?;
    ensure_positive("cao", cao)?;
    ensure_positive("cbo", cbo)?;

    let m = cbo / cao;
    let xa = to_conversion(values, mode, cao);

    if ratio_is(m, 1.0) {
        let y = map_finite(&xa, |x| x / (1.0 - x))?;
        return fit_single(Linearized::new(time.to_vec(), y), |r| r.slope / cao);
    }

    // (M - X)/(M(1 - X)) = 1 + X(M - 1)/(M(1 - X)); ln_1p keeps precision near M = 1.
    let y = map_finite(&xa, |x| (x * (m - 1.0) / (m * (1.0 - x))).ln_1p())?;
    fit_single(Linearized::new(time.to_vec(), y), |r| r.slope / (cao * (m - 1.0)))
}

/// Autocatalytic, `A + R → R + R`, `-rA = k·Ca·Cr`, with `M = Cro/Cao`.
pub fn autocatalytic(
    time: &[f64],
    values: &[f64],
    mode: InputMode,
    cao: f64,
    cro: f64,
) -> KineticsResult<KineticFit> {
    ensure_same_len(time, values)?;
    ensure_positive("cao", cao)?;
    ensure_positive("cro", cro)?;

    let m = cro / cao;
    let xa = to_conversion(values, mode, cao);
    let y = map_finite(&xa, |x| ((m + x) / (m * (1.0 - x))).ln())?;
    fit_single(Linearized::new(time.to_vec(), y), |r| r.slope / (cao + cro))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::{simulate_profile, ProfileSpec};
    use crate::domain::{InitialConcentrations, RateLaw};
    use crate::error::KineticsError;
    use approx::assert_relative_eq;

    fn profile(model: RateLaw, k: f64, initial: InitialConcentrations, t_max: f64) -> (Vec<f64>, Vec<f64>) {
        let spec = ProfileSpec {
            model,
            k,
            k2: 0.0,
            order: 1.0,
            initial,
            t_max,
            points: 21,
        };
        let p = simulate_profile(&spec).unwrap();
        (p.time, p.a)
    }

    fn conversions(ca: &[f64], cao: f64) -> Vec<f64> {
        ca.iter().map(|c| 1.0 - c / cao).collect()
    }

    #[test]
    fn first_order_recovers_k_on_exact_data() {
        let cao = 2.0;
        let k = 0.05;
        let time: Vec<f64> = (0..=50).map(|i| i as f64).collect();
        let ca: Vec<f64> = time.iter().map(|t| cao * (-k * t).exp()).collect();

        let fit = first_order(&time, &ca, InputMode::Concentration).unwrap();
        assert!((fit.k - k).abs() < 1e-6, "k = {}", fit.k);
        assert_relative_eq!(fit.rsq, 1.0, epsilon = 1e-9);

        let fit_x = first_order(&time, &conversions(&ca, cao), InputMode::Conversion).unwrap();
        assert_relative_eq!(fit_x.k, fit.k, epsilon = 1e-9);
        assert_relative_eq!(fit_x.rsq, fit.rsq, epsilon = 1e-9);
    }

    #[test]
    fn zeroth_order_modes_agree() {
        let initial = InitialConcentrations { cao: 4.0, ..Default::default() };
        let (time, ca) = profile(RateLaw::Zeroth, 0.1, initial, 20.0);

        let c = zeroth_order(&time, &ca, InputMode::Concentration, 4.0).unwrap();
        let x = zeroth_order(&time, &conversions(&ca, 4.0), InputMode::Conversion, 4.0).unwrap();
        assert_relative_eq!(c.k, 0.1, epsilon = 1e-9);
        assert_relative_eq!(x.k, c.k, epsilon = 1e-9);
        assert_relative_eq!(x.rsq, c.rsq, epsilon = 1e-9);
    }

    #[test]
    fn second_order_2a_modes_agree() {
        let initial = InitialConcentrations { cao: 1.5, ..Default::default() };
        let (time, ca) = profile(RateLaw::Second2A, 0.4, initial, 10.0);

        let c = second_order_2a(&time, &ca, InputMode::Concentration, 1.5).unwrap();
        let x = second_order_2a(&time, &conversions(&ca, 1.5), InputMode::Conversion, 1.5).unwrap();
        assert_relative_eq!(c.k, 0.4, epsilon = 1e-9);
        assert_relative_eq!(x.k, c.k, epsilon = 1e-9);
        assert_relative_eq!(x.rsq, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn second_order_ab_recovers_k_off_equimolar() {
        let initial = InitialConcentrations { cao: 1.0, cbo: 2.5, ..Default::default() };
        let (time, ca) = profile(RateLaw::SecondAB, 0.3, initial, 5.0);

        let c = second_order_ab(&time, &ca, InputMode::Concentration, 1.0, 2.5).unwrap();
        let x = second_order_ab(&time, &conversions(&ca, 1.0), InputMode::Conversion, 1.0, 2.5).unwrap();
        assert_relative_eq!(c.k, 0.3, epsilon = 1e-9);
        assert_relative_eq!(x.k, c.k, epsilon = 1e-9);
    }

    #[test]
    fn second_order_ab_equimolar_branch_matches_limit() {
        let k = 0.25;
        let equimolar = InitialConcentrations { cao: 2.0, cbo: 2.0, ..Default::default() };
        let (time, ca) = profile(RateLaw::SecondAB, k, equimolar, 8.0);
        let special = second_order_ab(&time, &ca, InputMode::Concentration, 2.0, 2.0).unwrap();
        assert_relative_eq!(special.k, k, epsilon = 1e-9);

        // General formula, Cbo slightly off Cao: same physics, same k in the limit.
        let near = InitialConcentrations { cao: 2.0, cbo: 2.0 * (1.0 + 1e-6), ..Default::default() };
        let (time, ca) = profile(RateLaw::SecondAB, k, near, 8.0);
        let general = second_order_ab(&time, &ca, InputMode::Concentration, 2.0, near.cbo).unwrap();
        assert_relative_eq!(general.k, special.k, max_relative = 1e-5);
        assert_relative_eq!(general.rsq, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn autocatalytic_recovers_k() {
        let initial = InitialConcentrations { cao: 1.0, cro: 0.1, ..Default::default() };
        let (time, ca) = profile(RateLaw::Autocatalytic, 0.8, initial, 6.0);

        let c = autocatalytic(&time, &ca, InputMode::Concentration, 1.0, 0.1).unwrap();
        let x = autocatalytic(&time, &conversions(&ca, 1.0), InputMode::Conversion, 1.0, 0.1).unwrap();
        assert_relative_eq!(c.k, 0.8, epsilon = 1e-9);
        assert_relative_eq!(x.k, c.k, epsilon = 1e-9);
    }

    #[test]
    fn full_conversion_is_reported_not_propagated() {
        let time = [0.0, 1.0, 2.0];
        let err = first_order(&time, &[0.0, 0.5, 1.0], InputMode::Conversion).unwrap_err();
        assert_eq!(err, KineticsError::NonFiniteTransform { index: 2 });

        let err = second_order_2a(&time, &[1.0, 0.5, 0.0], InputMode::Concentration, 1.0).unwrap_err();
        assert_eq!(err, KineticsError::NonFiniteTransform { index: 2 });
    }

    #[test]
    fn mismatched_series_are_rejected() {
        let err = first_order(&[0.0, 1.0], &[1.0, 0.5, 0.2], InputMode::Concentration).unwrap_err();
        assert_eq!(err, KineticsError::LengthMismatch { expected: 2, found: 3 });
    }

    #[test]
    fn fits_are_deterministic() {
        let (time, ca) = profile(RateLaw::First, 0.2, InitialConcentrations::default(), 10.0);
        let a = first_order(&time, &ca, InputMode::Concentration).unwrap();
        let b = first_order(&time, &ca, InputMode::Concentration).unwrap();
        assert_eq!(a.k.to_bits(), b.k.to_bits());
        assert_eq!(a.rsq.to_bits(), b.rsq.to_bits());
    }
}
