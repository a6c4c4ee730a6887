//! Error types.
//!
//! - `KineticsError` is returned by the numeric core (regression, linearization,
//!   order search). Every variant is a local arithmetic or input fault; nothing
//!   is retried.
//! - `AppError` is what the `kfit` binary reports: a message plus a process exit
//!   code.

/// Failures of the regression / linearization core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KineticsError {
    /// Paired series have different lengths.
    #[error("Series length mismatch: expected {expected} values, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// Zero variance (or too few points) makes slope / correlation undefined.
    #[error("Degenerate regression input: {0}")]
    DegenerateInput(&'static str),

    /// A regression input contained NaN or infinity.
    #[error("Regression input contains non-finite values")]
    NonFinite,

    /// The mode discriminator is neither `Conversion` nor `Concentration`.
    #[error("Invalid input mode '{0}' (expected 'Conversion' or 'Concentration')")]
    InvalidMode(String),

    /// No candidate order produced a positive rate constant.
    #[error("No physically valid reaction order found (no candidate gave k > 0)")]
    NoValidOrder,

    /// A linearizing transform produced NaN/infinity, e.g. `ln(0)` at full conversion.
    #[error("Linearized value at sample {index} is not finite")]
    NonFiniteTransform { index: usize },

    /// Initial concentrations make the integrated rate law singular.
    #[error("Singular stoichiometry: {0}")]
    SingularStoichiometry(String),

    /// A model constant (initial concentration, temperature, ...) is out of range.
    #[error("Invalid parameter {name} = {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Too few usable samples: need {needed}, found {found}")]
    TooFewPoints { needed: usize, found: usize },
}

/// Result alias for the numeric core.
pub type KineticsResult<T> = Result<T, KineticsError>;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<KineticsError> for AppError {
    fn from(err: KineticsError) -> Self {
        // 2 = bad input/config, 3 = insufficient data, 4 = numerical failure.
        let exit_code = match err {
            KineticsError::InvalidMode(_)
            | KineticsError::InvalidParameter { .. }
            | KineticsError::LengthMismatch { .. } => 2,
            KineticsError::TooFewPoints { .. } => 3,
            KineticsError::DegenerateInput(_)
            | KineticsError::NonFinite
            | KineticsError::NoValidOrder
            | KineticsError::NonFiniteTransform { .. }
            | KineticsError::SingularStoichiometry(_) => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinetics_errors_map_to_exit_codes() {
        let err: AppError = KineticsError::TooFewPoints { needed: 2, found: 1 }.into();
        assert_eq!(err.exit_code(), 3);

        let err: AppError = KineticsError::NoValidOrder.into();
        assert_eq!(err.exit_code(), 4);

        let err: AppError = KineticsError::InvalidMode("Pressure".into()).into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Pressure"));
    }
}
