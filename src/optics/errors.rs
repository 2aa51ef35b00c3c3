//! Errors for the element layer (materials, objects, surfaces, ray batches).
//!
//! This module defines a single error type, [`OpticsError`], raised when an
//! element-layer value is constructed from inconsistent inputs. Tracing
//! itself never produces these errors: rays that miss a surface or fall
//! outside a clear aperture are recorded as vignetted inside [`Rays`]
//! rather than reported.
//!
//! ## Conventions
//! - **Indices are 0-based**.
//! - Lengths are in system units (see `System::scale`); wavelengths are in
//!   metres.
//!
//! [`Rays`]: crate::optics::rays::Rays

/// Result alias for element-layer constructors.
pub type OpticsResult<T> = Result<T, OpticsError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OpticsError {
    // ---- Materials ----
    /// Refractive index must be finite and >= 1.
    InvalidIndex { nd: f64 },

    /// Abbe number must be positive (infinity means non-dispersive).
    InvalidAbbe { vd: f64 },

    // ---- Geometry ----
    /// Clear-aperture radius must be positive (infinity allowed).
    InvalidRadius { radius: f64, reason: &'static str },

    /// Origin offsets must be finite.
    NonFiniteOrigin { axis: usize, value: f64 },

    // ---- Object ----
    /// Field angle of an object at infinity must be finite and in [0, π/2).
    InvalidFieldAngle { angle: f64 },

    // ---- Ray batches ----
    /// Position/angle arrays must be `n × 3` with matching `n`.
    RayShapeMismatch { positions: (usize, usize), angles: (usize, usize) },

    /// Launch coordinates must be an `n × 2` array.
    LaunchShapeMismatch { found: (usize, usize) },
}

impl std::error::Error for OpticsError {}

impl std::fmt::Display for OpticsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpticsError::InvalidIndex { nd } => {
                write!(f, "Invalid refractive index {nd}: must be finite and >= 1")
            }
            OpticsError::InvalidAbbe { vd } => {
                write!(f, "Invalid Abbe number {vd}: must be positive")
            }
            OpticsError::InvalidRadius { radius, reason } => {
                write!(f, "Invalid clear-aperture radius {radius}: {reason}")
            }
            OpticsError::NonFiniteOrigin { axis, value } => {
                write!(f, "Non-finite origin offset on axis {axis}: {value}")
            }
            OpticsError::InvalidFieldAngle { angle } => {
                write!(f, "Invalid field angle {angle}: must be finite and in [0, pi/2)")
            }
            OpticsError::RayShapeMismatch { positions, angles } => {
                write!(
                    f,
                    "Ray array shape mismatch: positions {positions:?}, angles {angles:?}; \
                     expected matching (n, 3)"
                )
            }
            OpticsError::LaunchShapeMismatch { found } => {
                write!(f, "Launch coordinates must have shape (n, 2), found {found:?}")
            }
        }
    }
}
