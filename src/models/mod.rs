//! Linearized integrated rate laws for constant-volume batch reactors.
//!
//! Every model follows the same recipe:
//!
//! 1. bring the observations into the frame its formula is written in
//!    (concentration via `C = C0(1 - X)`, or conversion via `X = 1 - C/C0`)
//! 2. build `y'` (and, for shifting order, `x'`) so the rate law is a straight line
//! 3. regress with [`crate::math::try_fit`]
//! 4. map slope/intercept back to rate constants
//!
//! Models are implemented as small, pure functions so the pipeline and the order
//! search can stay generic.

pub mod arrhenius;
pub mod composite;
pub mod simple;
pub mod third_order;

pub use arrhenius::*;
pub use composite::*;
pub use simple::*;
pub use third_order::*;

use crate::domain::{KineticFit, Linearized};
use crate::error::KineticsResult;
use crate::math::{RegressionResult, try_fit};

/// Regress a linearized dataset and back-transform the line into a single `k`.
fn fit_single<F>(linearized: Linearized, back_transform: F) -> KineticsResult<KineticFit>
where
    F: FnOnce(&RegressionResult) -> f64,
{
    let regression = try_fit(&linearized.x, &linearized.y)?;
    let k = back_transform(&regression);
    Ok(KineticFit {
        k,
        rsq: regression.rsq,
        regression,
        linearized,
    })
}
