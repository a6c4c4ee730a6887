//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the models, the order search and the reports
//! - exported to JSON/CSV
//! - built from CLI flags (`ValueEnum`)

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::KineticsError;
use crate::math::RegressionResult;

/// How the observed species series is expressed.
///
/// This is a closed selector: anything else is rejected when parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum InputMode {
    /// Fractional extent of reaction, 0 (none) to 1 (complete).
    Conversion,
    /// Absolute amount per volume.
    Concentration,
}

impl FromStr for InputMode {
    type Err = KineticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conversion" => Ok(InputMode::Conversion),
            "concentration" => Ok(InputMode::Concentration),
            _ => Err(KineticsError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::Conversion => write!(f, "Conversion"),
            InputMode::Concentration => write!(f, "Concentration"),
        }
    }
}

/// Observed species columns a model may need besides time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    A,
    B,
    D,
    R,
    S,
}

impl Species {
    pub fn label(self) -> &'static str {
        match self {
            Species::A => "a",
            Species::B => "b",
            Species::D => "d",
            Species::R => "r",
            Species::S => "s",
        }
    }
}

/// Kinetic model (rate law) to fit against batch-reactor data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RateLaw {
    /// `-rA = k`
    Zeroth,
    /// `-rA = k·Ca`
    First,
    /// `2A → R`, `-rA = k·Ca²`
    #[value(name = "second-2a")]
    #[serde(rename = "second-2a")]
    Second2A,
    /// `A + B → R`, `-rA = k·Ca·Cb`
    #[value(name = "second-ab")]
    #[serde(rename = "second-ab")]
    SecondAB,
    /// `A + B + D → R`, `-rA = k·Ca·Cb·Cd`
    #[value(name = "third-abd")]
    #[serde(rename = "third-abd")]
    ThirdABD,
    /// `A + 2B → R`, `-rA = k·Ca·Cb²`
    #[value(name = "third-a2b")]
    #[serde(rename = "third-a2b")]
    ThirdA2B,
    /// `A + B → R`, `-rA = k·Ca·Cb²`
    #[value(name = "third-ab")]
    #[serde(rename = "third-ab")]
    ThirdAB,
    /// `A → R (k1)`, `A → S (k2)`, both first order.
    Parallel,
    /// `A + R → R + R`, `-rA = k·Ca·Cr`
    Autocatalytic,
    /// `-rA = k1·Ca / (1 + k2·Ca)`
    ShiftingOrder,
    /// `-rA = k·Ca^n` with unknown `n`, found by grid search.
    NthOrder,
}

impl RateLaw {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            RateLaw::Zeroth => "Zeroth order",
            RateLaw::First => "First order",
            RateLaw::Second2A => "Second order (2A -> R)",
            RateLaw::SecondAB => "Second order (A + B -> R)",
            RateLaw::ThirdABD => "Third order (A + B + D -> R)",
            RateLaw::ThirdA2B => "Third order (A + 2B -> R)",
            RateLaw::ThirdAB => "Third order (A + B -> R)",
            RateLaw::Parallel => "Parallel (A -> R, A -> S)",
            RateLaw::Autocatalytic => "Autocatalytic (A + R -> 2R)",
            RateLaw::ShiftingOrder => "Shifting order",
            RateLaw::NthOrder => "n-th order (grid search)",
        }
    }

    /// Species series the model reads, in argument order.
    pub fn species(self) -> &'static [Species] {
        match self {
            RateLaw::ThirdABD => &[Species::A, Species::B, Species::D],
            RateLaw::ThirdA2B | RateLaw::ThirdAB => &[Species::A, Species::B],
            RateLaw::Parallel => &[Species::A, Species::R, Species::S],
            _ => &[Species::A],
        }
    }

    /// Whether the model consumes the `Conversion`/`Concentration` selector.
    ///
    /// Parallel reactions are always fitted on concentrations.
    pub fn uses_mode(self) -> bool {
        self != RateLaw::Parallel
    }

    /// Whether the fit reads `Cao` for the given input mode.
    ///
    /// Single-series models that linearize concentrations directly only need it
    /// to convert conversions back.
    pub fn reads_cao(self, mode: InputMode) -> bool {
        match self {
            RateLaw::First | RateLaw::Parallel => false,
            RateLaw::Zeroth | RateLaw::Second2A | RateLaw::NthOrder => mode == InputMode::Conversion,
            _ => true,
        }
    }
}

/// Initial concentrations of the reacting species.
///
/// Unused entries are ignored by models that do not need them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialConcentrations {
    pub cao: f64,
    pub cbo: f64,
    pub cdo: f64,
    pub cro: f64,
}

impl Default for InitialConcentrations {
    fn default() -> Self {
        Self {
            cao: 1.0,
            cbo: 1.0,
            cdo: 1.0,
            cro: 1.0,
        }
    }
}

/// A linearized `(x', y')` dataset as handed to the regressor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Linearized {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Linearized {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { x, y }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// `y' - fitted` for every point.
    pub fn residuals(&self, line: &RegressionResult) -> Vec<f64> {
        self.x
            .iter()
            .zip(self.y.iter())
            .map(|(&x, &y)| y - line.predict(x))
            .collect()
    }
}

/// Fit of a model with a single rate constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KineticFit {
    pub k: f64,
    pub rsq: f64,
    pub regression: RegressionResult,
    pub linearized: Linearized,
}

/// Fit of a model with two rate constants (parallel, shifting order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoConstantFit {
    pub k1: f64,
    pub k2: f64,
    /// R² of the primary regression.
    pub rsq: f64,
    pub regression: RegressionResult,
    pub linearized: Linearized,
    /// Secondary regression, if the model needs one (parallel: `Cr` vs `Cs`).
    pub secondary: Option<RegressionResult>,
}

/// Best candidate of an order scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderSearchResult {
    pub order: f64,
    pub rsq: f64,
    pub rate_constant: f64,
    /// Candidates examined before the scan finished or stopped.
    pub candidates_evaluated: usize,
    /// `true` if the scan stopped on the R² threshold.
    pub early_stop: bool,
}

/// Arrhenius regression of `ln k` against `1/T`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrheniusFit {
    /// Activation energy over the gas constant, in kelvin.
    pub e_over_r: f64,
    pub rsq: f64,
    /// `A` in `k = A·exp(-E/RT)`, same units as the supplied `k`.
    pub pre_exponential: f64,
    /// Activation energy in J/mol.
    pub activation_energy: f64,
    pub regression: RegressionResult,
    pub linearized: Linearized,
}

/// Result of any fit, tagged by shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FitOutcome {
    Single(KineticFit),
    Pair(TwoConstantFit),
    Order(OrderSearchResult),
    Arrhenius(ArrheniusFit),
}

impl FitOutcome {
    /// The flat result tuple: `[k, rsq]`, `[k1, k2, rsq]`, `[order, rsq, k]` or `[E/R, rsq]`.
    pub fn to_tuple(&self) -> Vec<f64> {
        match self {
            FitOutcome::Single(f) => vec![f.k, f.rsq],
            FitOutcome::Pair(f) => vec![f.k1, f.k2, f.rsq],
            FitOutcome::Order(o) => vec![o.order, o.rsq, o.rate_constant],
            FitOutcome::Arrhenius(a) => vec![a.e_over_r, a.rsq],
        }
    }

    pub fn rsq(&self) -> f64 {
        match self {
            FitOutcome::Single(f) => f.rsq,
            FitOutcome::Pair(f) => f.rsq,
            FitOutcome::Order(o) => o.rsq,
            FitOutcome::Arrhenius(a) => a.rsq,
        }
    }

    /// Linearized data and fitted line, when the outcome carries them.
    pub fn linearized(&self) -> Option<(&Linearized, &RegressionResult)> {
        match self {
            FitOutcome::Single(f) => Some((&f.linearized, &f.regression)),
            FitOutcome::Pair(f) => Some((&f.linearized, &f.regression)),
            FitOutcome::Arrhenius(a) => Some((&a.linearized, &a.regression)),
            FitOutcome::Order(_) => None,
        }
    }
}

/// Portable JSON representation of one fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFile {
    pub tool: String,
    /// Rate-law name as accepted by `--model`, or `arrhenius`.
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<InputMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial: Option<InitialConcentrations>,
    pub outcome: FitOutcome,
    pub tuple: Vec<f64>,
}

/// CSV column names for each input series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub time: String,
    pub a: String,
    pub b: String,
    pub d: String,
    pub r: String,
    pub s: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            time: "t".to_string(),
            a: Species::A.label().to_string(),
            b: Species::B.label().to_string(),
            d: Species::D.label().to_string(),
            r: Species::R.label().to_string(),
            s: Species::S.label().to_string(),
        }
    }
}

impl ColumnNames {
    pub fn for_species(&self, species: Species) -> &str {
        match species {
            Species::A => &self.a,
            Species::B => &self.b,
            Species::D => &self.d,
            Species::R => &self.r,
            Species::S => &self.s,
        }
    }
}

/// A full `kfit fit` / `kfit order` run, as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub csv_path: PathBuf,
    pub model: RateLaw,
    pub mode: InputMode,
    pub initial: InitialConcentrations,
    pub columns: ColumnNames,

    /// R² above which the order scan stops early (`None` scans everything).
    pub early_stop_rsq: Option<f64>,
    /// Evaluate order candidates on the rayon pool.
    pub parallel: bool,

    pub show_points: bool,
    pub export_json: Option<PathBuf>,
    pub export_linearized: Option<PathBuf>,
}

/// A `kfit arrhenius` run.
#[derive(Debug, Clone)]
pub struct ArrheniusConfig {
    pub csv_path: PathBuf,
    pub k_column: String,
    pub temperature_column: String,
    pub show_points: bool,
    pub export_json: Option<PathBuf>,
}

/// A `kfit simulate` run.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub model: RateLaw,
    pub mode: InputMode,
    pub initial: InitialConcentrations,
    /// Rate constant (`k`, or `k1` for two-constant models).
    pub k: f64,
    /// Second rate constant for parallel / shifting-order models.
    pub k2: f64,
    /// Reaction order for `nth-order`.
    pub order: f64,
    pub t_max: f64,
    pub points: usize,
    /// Relative Gaussian noise on every observed value (0 = exact).
    pub noise: f64,
    pub seed: u64,
    pub output: Option<PathBuf>,
}
