use argmin::core::{ArgminError, Error};

use crate::{aiming::errors::AimError, optimization::lens_optimizer::types::Theta};
use crate::{optics::errors::OpticsError, system::errors::TraceError};

/// Result alias for everything in `optimization`.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// Finite-difference gradient has the wrong length.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Finite-difference gradient has a NaN or infinite entry.
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- OptimizeOptions ----
    /// `tol_grad` is not a positive finite number.
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },
    /// `tol_cost` is not a positive finite number.
    InvalidTolCost {
        tol: f64,
        reason: &'static str,
    },
    /// `max_iter` is zero.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// `Tolerances` with every field `None`.
    NoTolerancesProvided,

    /// Unknown line-search name.
    InvalidLineSearch {
        name: String,
        reason: &'static str,
    },

    /// Invalid solver method name.
    InvalidMethod {
        name: String,
        reason: &'static str,
    },

    /// L-BFGS history of zero.
    InvalidLBFGSMem {
        mem: usize,
        reason: &'static str,
    },

    /// Constraint penalty weight needs to be positive and finite.
    InvalidPenalty {
        value: f64,
        reason: &'static str,
    },

    /// Relative finite-difference step needs to be positive and finite.
    InvalidDiffStep {
        value: f64,
        reason: &'static str,
    },

    /// Wall-clock budget needs to be positive.
    InvalidTimeout {
        secs: f64,
    },

    // ---- Parameters ----
    /// A merit needs at least one free parameter.
    NoParameters,

    /// Parameter vector length does not match the number of parameters.
    ParameterDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Parameter target does not exist in the system.
    TargetOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },

    /// Lower bound must be below the upper bound and neither may be NaN.
    InvalidBounds {
        name: String,
        lower: f64,
        upper: f64,
    },

    /// Parameter scale needs to be positive and finite.
    InvalidScale {
        name: String,
        value: f64,
    },

    /// Parameter value needs to be finite.
    InvalidParameterValue {
        name: String,
        value: f64,
    },

    // ---- Merit evaluation ----
    /// Penalized cost is NaN or infinite.
    NonFiniteCost {
        value: f64,
    },

    /// A ray bundle lost every ray before the image.
    EmptyBundle {
        index: usize,
    },

    // ---- Run outcome ----
    /// Solver's best vector has a non-finite entry.
    InvalidBest {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Solver finished without a best vector.
    MissingBest,

    /// The solver stopped without meeting its tolerances.
    NotConverged {
        status: String,
        objective: f64,
        x: Theta,
    },

    // ---- Tracing ----
    /// Ray or paraxial trace of a trial system failed.
    Trace(TraceError),

    /// Ray aiming failed while building bundles.
    Aim(AimError),

    // ---- Solver backend ----
    /// `argmin` rejected a setting or failed internally; `kind` names the
    /// argmin error class.
    Solver {
        kind: &'static str,
        text: String,
    },

    /// Any other error that crossed the `argmin` boundary.
    Backend {
        text: String,
    },
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient has length {found}, expected {expected}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Gradient entry {index} is {value}: {reason}")
            }

            // ---- OptimizeOptions ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "tol_grad = {tol} rejected: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "tol_cost = {tol} rejected: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "max_iter = {max_iter} rejected: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "At least one of tol_grad, tol_cost, max_iter is required")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Unknown line search '{name}': {reason}")
            }
            OptError::InvalidMethod { name, reason } => {
                write!(f, "Invalid optimization method '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "lbfgs_mem = {mem} rejected: {reason}")
            }
            OptError::InvalidPenalty { value, reason } => {
                write!(f, "Invalid constraint penalty {value}: {reason}")
            }
            OptError::InvalidDiffStep { value, reason } => {
                write!(f, "Invalid finite-difference step {value}: {reason}")
            }
            OptError::InvalidTimeout { secs } => {
                write!(f, "Invalid timeout {secs} s, must be greater than zero")
            }

            // ---- Parameters ----
            OptError::NoParameters => {
                write!(f, "Merit has no parameters to vary")
            }
            OptError::ParameterDimMismatch { expected, found } => {
                write!(f, "Parameter vector length mismatch: expected {expected}, found {found}")
            }
            OptError::TargetOutOfRange { name, index, len } => {
                write!(f, "Parameter '{name}' targets element {index}, system has {len}")
            }
            OptError::InvalidBounds { name, lower, upper } => {
                write!(f, "Invalid bounds for parameter '{name}': [{lower}, {upper}]")
            }
            OptError::InvalidScale { name, value } => {
                write!(f, "Invalid scale for parameter '{name}': {value}, must be finite and > 0")
            }
            OptError::InvalidParameterValue { name, value } => {
                write!(f, "Invalid value for parameter '{name}': {value}, must be finite")
            }

            // ---- Merit evaluation ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Penalized merit cost is {value}")
            }
            OptError::EmptyBundle { index } => {
                write!(f, "Ray bundle {index} has no unvignetted rays at the image")
            }

            // ---- Run outcome ----
            OptError::InvalidBest { index, value, reason } => {
                write!(f, "Best vector entry {index} is {value}: {reason}")
            }
            OptError::MissingBest => {
                write!(f, "Solver returned no best vector")
            }
            OptError::NotConverged { status, objective, x } => {
                write!(f, "Optimization did not converge ({status}); ")?;
                write!(f, "best objective {objective:e} at {x}")
            }

            // ---- Tracing ----
            OptError::Trace(err) => write!(f, "Trace failed: {err}"),
            OptError::Aim(err) => write!(f, "Aiming failed: {err}"),

            // ---- Solver backend ----
            OptError::Solver { kind, text } => write!(f, "Solver error ({kind}): {text}"),
            OptError::Backend { text } => write!(f, "Solver backend error: {text}"),
        }
    }
}

/// Recover errors raised inside cost or gradient evaluations as their own
/// variants; classify the rest by argmin's taxonomy.
impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        let err = match err.downcast::<OptError>() {
            Ok(own) => return own,
            Err(err) => err,
        };
        match err.downcast::<ArgminError>() {
            Ok(argmin_err) => {
                let kind = match &argmin_err {
                    ArgminError::InvalidParameter { .. } => "invalid parameter",
                    ArgminError::NotImplemented { .. } => "not implemented",
                    ArgminError::NotInitialized { .. } => "not initialized",
                    ArgminError::ConditionViolated { .. } => "condition violated",
                    ArgminError::CheckpointNotFound { .. } => "checkpoint not found",
                    ArgminError::PotentialBug { .. } => "potential bug",
                    ArgminError::ImpossibleError { .. } => "impossible state",
                    _ => "unclassified",
                };
                OptError::Solver { kind, text: argmin_err.to_string() }
            }
            Err(other) => OptError::Backend { text: other.to_string() },
        }
    }
}

impl From<TraceError> for OptError {
    fn from(err: TraceError) -> Self {
        OptError::Trace(err)
    }
}

impl From<OpticsError> for OptError {
    fn from(err: OpticsError) -> Self {
        OptError::Trace(TraceError::Optics(err))
    }
}

impl From<AimError> for OptError {
    fn from(err: AimError) -> Self {
        OptError::Aim(err)
    }
}
