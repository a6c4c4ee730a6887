//! Synthetic batch-reactor profiles.
//!
//! Profiles come straight from the rate law, not from the linearizations in
//! `crate::models`:
//!
//! - closed-form integrated solutions where they exist
//! - fixed-step RK4 on the reaction extent otherwise (third order, shifting order)
//!
//! `generate_sample` then converts to the requested input mode and adds seeded,
//! relative Gaussian noise, so runs are reproducible for a given seed.

use log::warn;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{InitialConcentrations, InputMode, RateLaw, SimulationConfig};
use crate::error::AppError;
use crate::math::{ratio_is, to_conversion};

/// RK4 steps per sampling interval.
const RK4_SUBSTEPS: usize = 1000;

/// What to simulate (noise-free).
#[derive(Debug, Clone)]
pub struct ProfileSpec {
    pub model: RateLaw,
    /// `k`, or `k1` for parallel / shifting order.
    pub k: f64,
    /// `k2` for parallel / shifting order.
    pub k2: f64,
    /// Reaction order, used by `NthOrder` only.
    pub order: f64,
    pub initial: InitialConcentrations,
    pub t_max: f64,
    pub points: usize,
}

/// Noise-free concentration profiles on a uniform time grid.
#[derive(Debug, Clone)]
pub struct Profile {
    pub time: Vec<f64>,
    pub a: Vec<f64>,
    pub b: Option<Vec<f64>>,
    pub d: Option<Vec<f64>>,
    pub r: Option<Vec<f64>>,
    pub s: Option<Vec<f64>>,
}

/// A generated dataset, ready to be written as CSV.
#[derive(Debug, Clone)]
pub struct SampleData {
    pub mode: InputMode,
    /// `(header, values)` in output column order, time first.
    pub columns: Vec<(String, Vec<f64>)>,
}

/// Simulate the concentration profiles of `spec.model`.
pub fn simulate_profile(spec: &ProfileSpec) -> Result<Profile, AppError> {
    validate_spec(spec)?;

    let time: Vec<f64> = (0..spec.points)
        .map(|i| spec.t_max * i as f64 / (spec.points - 1) as f64)
        .collect();
    let InitialConcentrations { cao, cbo, cdo, cro } = spec.initial;
    let k = spec.k;

    let mut profile = Profile {
        time: time.clone(),
        a: Vec::new(),
        b: None,
        d: None,
        r: None,
        s: None,
    };

    match spec.model {
        RateLaw::Zeroth => {
            profile.a = time.iter().map(|t| (cao - k * t).max(0.0)).collect();
            if profile.a.last().is_some_and(|c| *c <= 0.0) {
                warn!("zeroth-order profile reaches Ca = 0 before t_max; clamped at zero");
            }
        }
        RateLaw::First => {
            profile.a = time.iter().map(|t| cao * (-k * t).exp()).collect();
        }
        RateLaw::Second2A => {
            profile.a = time.iter().map(|t| 1.0 / (1.0 / cao + k * t)).collect();
        }
        RateLaw::SecondAB => {
            let m = cbo / cao;
            let xa: Vec<f64> = time
                .iter()
                .map(|t| {
                    if ratio_is(m, 1.0) {
                        let u = cao * k * t;
                        u / (1.0 + u)
                    } else {
                        let em1 = (cao * (m - 1.0) * k * t).exp_m1();
                        m * em1 / (m * em1 + (m - 1.0))
                    }
                })
                .collect();
            profile.a = xa.iter().map(|x| cao * (1.0 - x)).collect();
            profile.b = Some(xa.iter().map(|x| cbo - cao * x).collect());
        }
        RateLaw::ThirdABD => {
            let extent = integrate_extent(&time, |x| k * (cao - x) * (cbo - x) * (cdo - x));
            profile.a = extent.iter().map(|x| cao - x).collect();
            profile.b = Some(extent.iter().map(|x| cbo - x).collect());
            profile.d = Some(extent.iter().map(|x| cdo - x).collect());
        }
        RateLaw::ThirdA2B => {
            let extent = integrate_extent(&time, |x| {
                let cb = cbo - 2.0 * x;
                k * (cao - x) * cb * cb
            });
            profile.a = extent.iter().map(|x| cao - x).collect();
            profile.b = Some(extent.iter().map(|x| cbo - 2.0 * x).collect());
        }
        RateLaw::ThirdAB => {
            let extent = integrate_extent(&time, |x| {
                let cb = cbo - x;
                k * (cao - x) * cb * cb
            });
            profile.a = extent.iter().map(|x| cao - x).collect();
            profile.b = Some(extent.iter().map(|x| cbo - x).collect());
        }
        RateLaw::Parallel => {
            let k_sum = k + spec.k2;
            profile.a = time.iter().map(|t| cao * (-k_sum * t).exp()).collect();
            let reacted: Vec<f64> = profile.a.iter().map(|c| cao - c).collect();
            profile.r = Some(reacted.iter().map(|x| k / k_sum * x).collect());
            profile.s = Some(reacted.iter().map(|x| spec.k2 / k_sum * x).collect());
        }
        RateLaw::Autocatalytic => {
            let m = cro / cao;
            let xa: Vec<f64> = time
                .iter()
                .map(|t| {
                    let e = ((cao + cro) * k * t).exp();
                    m * (e - 1.0) / (1.0 + m * e)
                })
                .collect();
            profile.a = xa.iter().map(|x| cao * (1.0 - x)).collect();
            profile.r = Some(xa.iter().map(|x| cro + cao * x).collect());
        }
        RateLaw::ShiftingOrder => {
            let k2 = spec.k2;
            let extent = integrate_extent(&time, |x| {
                let ca = cao - x;
                k * ca / (1.0 + k2 * ca)
            });
            profile.a = extent.iter().map(|x| cao - x).collect();
        }
        RateLaw::NthOrder => {
            let n = spec.order;
            profile.a = if ratio_is(n, 1.0) {
                time.iter().map(|t| cao * (-k * t).exp()).collect()
            } else {
                time.iter()
                    .map(|t| {
                        let base = cao.powf(1.0 - n) + (n - 1.0) * k * t;
                        if base > 0.0 { base.powf(1.0 / (1.0 - n)) } else { 0.0 }
                    })
                    .collect()
            };
        }
    }

    Ok(profile)
}

/// Simulate, convert to the requested mode and add noise.
pub fn generate_sample(config: &SimulationConfig) -> Result<SampleData, AppError> {
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::new(2, "Noise level must be finite and >= 0."));
    }

    let profile = simulate_profile(&ProfileSpec {
        model: config.model,
        k: config.k,
        k2: config.k2,
        order: config.order,
        initial: config.initial,
        t_max: config.t_max,
        points: config.points,
    })?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let InitialConcentrations { cao, cbo, cdo, cro } = config.initial;
    // Parallel reactions are always fitted on concentrations.
    let mode = if config.model.uses_mode() {
        config.mode
    } else {
        InputMode::Concentration
    };

    let mut columns = vec![("t".to_string(), profile.time.clone())];
    let species = [
        ("a", Some(profile.a), cao),
        ("b", profile.b, cbo),
        ("d", profile.d, cdo),
        ("r", profile.r, cro),
        ("s", profile.s, 1.0),
    ];
    for (name, values, c0) in species {
        let Some(values) = values else { continue };
        let noisy: Vec<f64> = values
            .iter()
            .map(|v| v * (1.0 + config.noise * normal.sample(&mut rng)))
            .collect();
        let observed = match (name, mode) {
            // Products are reported as concentrations regardless of mode.
            ("r" | "s", _) | (_, InputMode::Concentration) => noisy,
            (_, InputMode::Conversion) => to_conversion(&noisy, InputMode::Concentration, c0),
        };
        columns.push((name.to_string(), observed));
    }

    Ok(SampleData { mode, columns })
}

fn validate_spec(spec: &ProfileSpec) -> Result<(), AppError> {
    if spec.points < 2 {
        return Err(AppError::new(2, "Need at least 2 sample points."));
    }
    if !(spec.t_max.is_finite() && spec.t_max > 0.0) {
        return Err(AppError::new(2, format!("Invalid t_max={} (must be finite and > 0).", spec.t_max)));
    }
    if !(spec.k.is_finite() && spec.k > 0.0) {
        return Err(AppError::new(2, format!("Invalid rate constant k={} (must be > 0).", spec.k)));
    }
    let needs_k2 = matches!(spec.model, RateLaw::Parallel | RateLaw::ShiftingOrder);
    if needs_k2 && !(spec.k2.is_finite() && spec.k2 > 0.0) {
        return Err(AppError::new(2, format!("Invalid k2={} (must be > 0).", spec.k2)));
    }
    if spec.model == RateLaw::NthOrder && !spec.order.is_finite() {
        return Err(AppError::new(2, "Reaction order must be finite."));
    }
    let c = spec.initial;
    for (name, value) in [("cao", c.cao), ("cbo", c.cbo), ("cdo", c.cdo), ("cro", c.cro)] {
        if !(value.is_finite() && value > 0.0) {
            return Err(AppError::new(2, format!("Invalid initial concentration {name}={value}.")));
        }
    }
    Ok(())
}

/// Integrate `dx/dt = rate(x)` from `x(0) = 0` with RK4, sampling at `time`.
fn integrate_extent<F>(time: &[f64], rate: F) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    let mut out = Vec::with_capacity(time.len());
    let mut x = 0.0;
    let mut t_prev = time.first().copied().unwrap_or(0.0);
    for &t in time {
        let h = (t - t_prev) / RK4_SUBSTEPS as f64;
        if h > 0.0 {
            for _ in 0..RK4_SUBSTEPS {
                let k1 = rate(x);
                let k2 = rate(x + 0.5 * h * k1);
                let k3 = rate(x + 0.5 * h * k2);
                let k4 = rate(x + h * k3);
                x += h / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4);
            }
        }
        out.push(x);
        t_prev = t;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spec(model: RateLaw) -> ProfileSpec {
        ProfileSpec {
            model,
            k: 0.2,
            k2: 0.1,
            order: 2.0,
            initial: InitialConcentrations::default(),
            t_max: 10.0,
            points: 11,
        }
    }

    #[test]
    fn rk4_matches_closed_form_first_order() {
        let time: Vec<f64> = (0..=10).map(|i| i as f64).collect();
        let extent = integrate_extent(&time, |x| 0.3 * (2.0 - x));
        for (t, x) in time.iter().zip(extent.iter()) {
            assert_relative_eq!(2.0 - x, 2.0 * (-0.3 * t).exp(), max_relative = 1e-10);
        }
    }

    #[test]
    fn nth_order_two_matches_second_order() {
        let nth = simulate_profile(&spec(RateLaw::NthOrder)).unwrap();
        let second = simulate_profile(&spec(RateLaw::Second2A)).unwrap();
        for (a, b) in nth.a.iter().zip(second.a.iter()) {
            assert_relative_eq!(a, b, max_relative = 1e-12);
        }
    }

    #[test]
    fn profiles_carry_the_species_each_model_needs() {
        for model in [RateLaw::ThirdABD, RateLaw::Parallel, RateLaw::SecondAB] {
            let p = simulate_profile(&spec(model)).unwrap();
            for species in model.species() {
                let present = match species.label() {
                    "a" => true,
                    "b" => p.b.is_some(),
                    "d" => p.d.is_some(),
                    "r" => p.r.is_some(),
                    _ => p.s.is_some(),
                };
                assert!(present, "{model:?} missing {}", species.label());
            }
        }
    }

    #[test]
    fn invalid_specs_are_rejected() {
        let mut s = spec(RateLaw::First);
        s.points = 1;
        assert_eq!(simulate_profile(&s).unwrap_err().exit_code(), 2);

        let mut s = spec(RateLaw::Parallel);
        s.k2 = 0.0;
        assert!(simulate_profile(&s).is_err());
    }

    #[test]
    fn seeded_noise_is_reproducible() {
        let config = SimulationConfig {
            model: RateLaw::First,
            mode: InputMode::Conversion,
            initial: InitialConcentrations::default(),
            k: 0.1,
            k2: 0.0,
            order: 1.0,
            t_max: 10.0,
            points: 11,
            noise: 0.01,
            seed: 7,
            output: None,
        };
        let a = generate_sample(&config).unwrap();
        let b = generate_sample(&config).unwrap();
        assert_eq!(a.columns, b.columns);
        assert_eq!(a.columns[0].0, "t");
        assert_eq!(a.columns[1].0, "a");
        // Conversion starts near zero.
        assert!(a.columns[1].1[0].abs() < 0.05);
    }
}
