use crate::{optics::errors::OpticsError, system::errors::TraceError};

/// Result alias for ray-aiming operations.
pub type AimResult<T> = Result<T, AimError>;

#[derive(Debug, Clone, PartialEq)]
pub enum AimError {
    // ---- Configuration ----
    /// The system cannot be aimed as assembled (stop count, launch shape).
    Trace(TraceError),

    /// An aiming option is out of range.
    InvalidOption { name: &'static str, value: f64, reason: &'static str },

    // ---- Root finding ----
    /// The iteration budget ran out before the step tolerance was met.
    NonConvergence { iterations: usize, residual: f64 },

    /// The pupil map cannot be driven to the target: a probe ray never
    /// reached the stop, or the map is locally flat or singular.
    StopNotReached { reason: &'static str },
}

impl std::error::Error for AimError {}

impl std::fmt::Display for AimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AimError::Trace(err) => write!(f, "Cannot aim system: {err}"),
            AimError::InvalidOption { name, value, reason } => {
                write!(f, "Invalid aiming option {name} = {value}: {reason}")
            }
            AimError::NonConvergence { iterations, residual } => {
                write!(f, "Ray aiming did not converge after {iterations} iterations ")?;
                write!(f, "(residual {residual:e})")
            }
            AimError::StopNotReached { reason } => {
                write!(f, "Aperture stop not reached: {reason}")
            }
        }
    }
}

impl From<TraceError> for AimError {
    fn from(err: TraceError) -> Self {
        AimError::Trace(err)
    }
}

impl From<OpticsError> for AimError {
    fn from(err: OpticsError) -> Self {
        AimError::Trace(TraceError::Optics(err))
    }
}
