//! Models with two rate constants: parallel reactions and shifting order.

use log::debug;
use nalgebra::{Matrix2, Vector2};

use crate::domain::{InputMode, Linearized, TwoConstantFit};
use crate::error::{KineticsError, KineticsResult};
use crate::math::{ensure_positive, ensure_same_len, map_finite, solve_2x2, to_concentration, try_fit};

/// Parallel first-order reactions `A → R (k1)` and `A → S (k2)`.
///
/// Two independent regressions:
/// - `-ln Ca` against time has slope `k1 + k2`
/// - `Cr` against `Cs` has slope `k1 / k2`
///
/// and the pair is recovered from
///
/// ```text
/// | 1   1     | |k1|   |k1 + k2|
/// | 1  -ratio | |k2| = |   0   |
/// ```
///
/// `rsq` is that of the `-ln Ca` regression; the `Cr`/`Cs` fit is kept as `secondary`.
pub fn parallel_reactions(time: &[f64], a: &[f64], r: &[f64], s: &[f64]) -> KineticsResult<TwoConstantFit> {
    ensure_same_len(time, a)?;
    ensure_same_len(time, r)?;
    ensure_same_len(time, s)?;

    let y = map_finite(a, |c| -c.ln())?;
    let linearized = Linearized::new(time.to_vec(), y);
    let sum_fit = try_fit(&linearized.x, &linearized.y)?;
    let ratio_fit = try_fit(s, r)?;

    let k_sum = sum_fit.slope;
    let ratio = ratio_fit.slope;
    debug!("parallel: k1+k2={k_sum:.6e}, k1/k2={ratio:.6e}");

    let system = Matrix2::new(1.0, 1.0, 1.0, -ratio);
    let Some(k) = solve_2x2(system, Vector2::new(k_sum, 0.0)) else {
        return Err(KineticsError::SingularStoichiometry(format!(
            "product ratio k1/k2 = {ratio} leaves the parallel system singular"
        )));
    };

    Ok(TwoConstantFit {
        k1: k[0],
        k2: k[1],
        rsq: sum_fit.rsq,
        regression: sum_fit,
        linearized,
        secondary: Some(ratio_fit),
    })
}

/// Shifting order, `-rA = k1·Ca / (1 + k2·Ca)`.
///
/// Integrated and rearranged:
///
/// ```text
/// ln(Cao/Ca) / (Cao - Ca) = k1 · t / (Cao - Ca) - k2
/// ```
///
/// Samples with `Ca = Cao` (no reaction yet, usually `t = 0`) have no defined
/// coordinates and are left out of the regression.
pub fn shifting_order(time: &[f64], values: &[f64], mode: InputMode, cao: f64) -> KineticsResult<TwoConstantFit> {
    ensure_same_len(time, values)?;
    ensure_positive("cao", cao)?;

    let ca = to_concentration(values, mode, cao);

    let mut x = Vec::with_capacity(ca.len());
    let mut y = Vec::with_capacity(ca.len());
    for (index, (&t, &c)) in time.iter().zip(ca.iter()).enumerate() {
        let reacted = cao - c;
        if reacted.abs() <= f64::EPSILON * cao {
            debug!("shifting order: skipping sample {index} (Ca = Cao)");
            continue;
        }
        let xi = t / reacted;
        let yi = (cao / c).ln() / reacted;
        if !(xi.is_finite() && yi.is_finite()) {
            return Err(KineticsError::NonFiniteTransform { index });
        }
        x.push(xi);
        y.push(yi);
    }
    if x.len() < 2 {
        return Err(KineticsError::TooFewPoints {
            needed: 2,
            found: x.len(),
        });
    }

    let linearized = Linearized::new(x, y);
    let regression = try_fit(&linearized.x, &linearized.y)?;
    Ok(TwoConstantFit {
        k1: regression.slope,
        k2: -regression.intercept,
        rsq: regression.rsq,
        regression,
        linearized,
        secondary: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::{simulate_profile, ProfileSpec};
    use crate::domain::{InitialConcentrations, RateLaw};
    use approx::assert_relative_eq;

    #[test]
    fn parallel_recovers_both_constants() {
        let p = simulate_profile(&ProfileSpec {
            model: RateLaw::Parallel,
            k: 0.3,
            k2: 0.1,
            order: 1.0,
            initial: InitialConcentrations { cao: 2.0, ..Default::default() },
            t_max: 10.0,
            points: 21,
        })
        .unwrap();

        let fit = parallel_reactions(&p.time, &p.a, p.r.as_ref().unwrap(), p.s.as_ref().unwrap()).unwrap();
        assert_relative_eq!(fit.k1, 0.3, max_relative = 1e-9);
        assert_relative_eq!(fit.k2, 0.1, max_relative = 1e-9);
        assert_relative_eq!(fit.rsq, 1.0, epsilon = 1e-9);
        let ratio = fit.secondary.unwrap();
        assert_relative_eq!(ratio.slope, 3.0, max_relative = 1e-9);
    }

    #[test]
    fn parallel_with_minus_one_ratio_is_singular() {
        let t = [0.0, 1.0, 2.0, 3.0];
        let a = [1.0, 0.5, 0.25, 0.125];
        let s = [0.0, 1.0, 2.0, 3.0];
        let r = [0.0, -1.0, -2.0, -3.0];
        let err = parallel_reactions(&t, &a, &r, &s).unwrap_err();
        assert!(matches!(err, KineticsError::SingularStoichiometry(_)));
    }

    #[test]
    fn shifting_order_recovers_k1_k2_and_skips_t0() {
        let p = simulate_profile(&ProfileSpec {
            model: RateLaw::ShiftingOrder,
            k: 0.6,
            k2: 0.4,
            order: 1.0,
            initial: InitialConcentrations { cao: 3.0, ..Default::default() },
            t_max: 15.0,
            points: 16,
        })
        .unwrap();

        let fit = shifting_order(&p.time, &p.a, InputMode::Concentration, 3.0).unwrap();
        assert_eq!(fit.linearized.len(), 15);
        assert_relative_eq!(fit.k1, 0.6, max_relative = 1e-6);
        assert_relative_eq!(fit.k2, 0.4, max_relative = 1e-5);

        let x: Vec<f64> = p.a.iter().map(|c| 1.0 - c / 3.0).collect();
        let fit_x = shifting_order(&p.time, &x, InputMode::Conversion, 3.0).unwrap();
        assert_relative_eq!(fit_x.k1, fit.k1, max_relative = 1e-8);
        assert_relative_eq!(fit_x.k2, fit.k2, max_relative = 1e-8);
    }

    #[test]
    fn shifting_order_needs_two_reacted_samples() {
        let err = shifting_order(&[0.0, 1.0], &[2.0, 1.0], InputMode::Concentration, 2.0).unwrap_err();
        assert_eq!(err, KineticsError::TooFewPoints { needed: 2, found: 1 });
    }
}
