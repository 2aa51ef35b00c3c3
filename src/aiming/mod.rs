//! aiming — chief and marginal ray aiming.
//!
//! Purpose
//! -------
//! Find object-space launch coordinates whose exact rays cross the centre
//! and the edge of the aperture stop, and build pupil-filling ray bundles
//! from them for merit evaluation.
//!
//! Key behaviors
//! -------------
//! - [`chief_and_marginal`]: paraxial (linear extrapolation) or exact
//!   (root finding) strategies, selected per ray family in [`AimOptions`].
//! - [`ray_bundle`]: aim, then fill the pupil with a clipped square grid.
//! - [`roots`]: the secant and Gauss–Newton solvers used by the exact
//!   strategies.
//!
//! Invariants & assumptions
//! ------------------------
//! - The system has exactly one aperture stop. Anything else is a
//!   configuration error returned before tracing.
//! - Convergence failure, a lost stop, and configuration errors are distinct
//!   [`AimError`] variants.
//!
//! Downstream usage
//! ----------------
//! - Call [`ray_bundle`] once per field point and wavelength before
//!   optimization; the bundles are reused as-is for every evaluation.

pub mod chief_marginal;
pub mod errors;
pub mod options;
pub mod roots;

pub use self::chief_marginal::{AimSolution, chief_and_marginal, ray_bundle};
pub use self::errors::{AimError, AimResult};
pub use self::options::{AimOptions, AimStrategy};

pub mod prelude {
    pub use super::chief_marginal::{AimSolution, chief_and_marginal, ray_bundle};
    pub use super::errors::{AimError, AimResult};
    pub use super::options::{AimOptions, AimStrategy};
}
