//! optrace — sequential ray tracing, ray aiming, and lens optimization.
//!
//! Purpose
//! -------
//! Model a sequential optical system as an ordered chain of elements, trace
//! batches of rays through it exactly and paraxially, aim chief and marginal
//! rays at the aperture stop, and improve the design by minimizing a merit
//! function over selected parameters.
//!
//! Key behaviors
//! -------------
//! - `optics`: materials, surface geometry, elements, the object, and the
//!   [`optics::Rays`] batch value.
//! - `system`: the [`system::System`] chain, exact propagation with
//!   per-node records, and the paraxial trace (first-order properties and
//!   third-order aberration sums).
//! - `aiming`: paraxial and exact strategies for chief and marginal rays,
//!   and pupil-filling bundles built on them.
//! - `optimization`: merit functions and an Argmin-backed driver.
//!
//! Invariants & assumptions
//! ------------------------
//! - Element origins are offsets from the previous vertex; moving one
//!   element shifts everything after it.
//! - Rays that miss a surface or aperture are flagged, never dropped, so
//!   batch shapes are stable through a trace.
//! - Each layer reports failures through its own error enum
//!   (`OpticsError`, `TraceError`, `AimError`, `OptError`); the outer ones
//!   wrap the inner ones.
//!
//! Conventions
//! -----------
//! - Lengths share one unit chosen by the caller; wavelengths are in metres.
//! - `+z` is the optical axis towards the image.
//!
//! Downstream usage
//! ----------------
//! - Import everything commonly needed with `use optrace::prelude::*;`.

pub mod aiming;
pub mod optics;
pub mod optimization;
pub mod system;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use optrace::prelude::*;
//
// to import the main surface in a single line.

pub mod prelude {
    pub use crate::aiming::prelude::*;
    pub use crate::optics::prelude::*;
    pub use crate::optimization::prelude::*;
    pub use crate::system::prelude::*;
}
