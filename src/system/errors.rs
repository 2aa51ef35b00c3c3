//! Errors for system assembly and propagation.
//!
//! [`TraceError`] covers structural problems with a chain (missing or
//! ambiguous aperture stop, degenerate paraxial geometry) and invalid system
//! metadata. These are configuration errors: they are returned immediately
//! and retrying with the same system cannot succeed.
use crate::optics::errors::OpticsError;

/// Result alias for system and propagation operations.
pub type TraceResult<T> = Result<T, TraceError>;

#[derive(Debug, Clone, PartialEq)]
pub enum TraceError {
    // ---- Aperture stop ----
    /// The chain has no aperture stop.
    NoAperture,

    /// Aiming needs exactly one aperture stop.
    ApertureCount { found: usize },

    // ---- Paraxial ----
    /// A trial paraxial ray never reaches the stop off-axis, so marginal and
    /// chief rays cannot be scaled.
    DegenerateParaxial { reason: &'static str },

    // ---- Metadata ----
    /// The wavelength list must not be empty.
    EmptyWavelengths,

    /// Wavelengths must be finite and positive.
    InvalidWavelength { index: usize, value: f64 },

    // ---- Element layer ----
    Optics(OpticsError),
}

impl std::error::Error for TraceError {}

impl std::fmt::Display for TraceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceError::NoAperture => write!(f, "No aperture stop in the element chain"),
            TraceError::ApertureCount { found } => {
                write!(f, "Expected exactly one aperture stop, found {found}")
            }
            TraceError::DegenerateParaxial { reason } => {
                write!(f, "Degenerate paraxial geometry: {reason}")
            }
            TraceError::EmptyWavelengths => write!(f, "Wavelength list is empty"),
            TraceError::InvalidWavelength { index, value } => {
                write!(f, "Invalid wavelength at index {index}: {value}, must be finite and > 0")
            }
            TraceError::Optics(err) => write!(f, "Element error: {err}"),
        }
    }
}

impl From<OpticsError> for TraceError {
    fn from(err: OpticsError) -> Self {
        TraceError::Optics(err)
    }
}
