//! system — assembled optical systems and the propagation engine.
//!
//! Purpose
//! -------
//! Hold an object, an ordered element chain, and an image, and sequence the
//! element capabilities from [`crate::optics`] into whole-system traces:
//! exact ray batches (lazily, node by node) and the paraxial marginal/chief
//! pair (eagerly, into a [`ParaxialTrace`]).
//!
//! Key behaviors
//! -------------
//! - [`System`]: assembly, stop resolution, reversal, and concatenation.
//! - [`System::propagate`] / [`System::propagate_through`] /
//!   [`System::height_at_aperture`]: exact propagation and the pupil map.
//! - [`System::propagate_paraxial`] / [`System::height_at_aperture_paraxial`]
//!   and [`ParaxialTrace`]: first-order layout and third-order sums.
//!
//! Invariants & assumptions
//! ------------------------
//! - Stop positions are recomputed on every structural change, so they are
//!   never stale.
//! - Structural errors are [`TraceError`]s and are returned before any ray
//!   is traced; vignetting never is.
//!
//! Downstream usage
//! ----------------
//! - `aiming` uses `height_at_aperture` as the function whose roots it
//!   finds; `optimization` clones systems per evaluation and reads
//!   [`ParaxialTrace`] queries in its demerits.
//!
//! Testing notes
//! -------------
//! - Shared test systems live in `fixtures`: a biconvex singlet with the
//!   stop in front and the same lens with a smaller stop behind it.

pub mod errors;
pub mod paraxial;
pub mod propagation;
#[allow(clippy::module_inception)]
pub mod system;

#[cfg(test)]
pub(crate) mod fixtures;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{TraceError, TraceResult};
pub use self::paraxial::ParaxialTrace;
pub use self::propagation::{Node, Propagation};
pub use self::system::System;

pub mod prelude {
    pub use super::errors::{TraceError, TraceResult};
    pub use super::paraxial::ParaxialTrace;
    pub use super::system::System;
}
