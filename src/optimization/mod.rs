//! optimization — merit functions, solver driver, and unified error surface.
//!
//! Purpose
//! -------
//! Provide the lens-design optimization layer: describe what may vary
//! (parameters), what should shrink (demerits), and what must hold
//! (constraints), then minimize with an Argmin-backed driver that keeps
//! every trial design inside its bounds.
//!
//! Key behaviors
//! -------------
//! - `merit`: traits and stock implementations for parameters, demerits,
//!   and constraints, plus the [`merit::MeritFunction`] that evaluates them
//!   against a cloned system.
//! - `lens_optimizer`: [`lens_optimizer::optimize`], solver construction,
//!   finite-difference gradients, and the normalized outcome.
//! - `numerical_stability`: smooth, invertible maps between bounded
//!   parameters and the unconstrained solver space.
//! - `errors`: a single enum ([`errors::OptError`]) that also wraps trace
//!   and aiming failures and `argmin` backend errors.
//!
//! Invariants & assumptions
//! ------------------------
//! - Merit evaluation never mutates the caller's system; each evaluation
//!   works on a fresh clone.
//! - Invalid states are reported as `OptError`, not panics.
//!
//! Conventions
//! -----------
//! - The scalar minimized by every solver is
//!   `‖F‖² + penalty · (‖h‖² + ‖max(0, g)‖²)`, with `F` the weighted demerit
//!   residuals, `h` equality and `g` inequality constraint values.
//! - Public entrypoints that can fail return `OptResult<T>`; callers never
//!   see raw Argmin errors.
//!
//! Downstream usage
//! ----------------
//! - Import the curated surface via `optimization::prelude::*`, or the
//!   submodule preludes for a finer split.
//!
//! Testing notes
//! -------------
//! - Unit tests in each submodule cover local behavior; `lens_optimizer::api`
//!   and the integration tests run complete optimizations on small systems.

pub mod errors;
pub mod lens_optimizer;
pub mod merit;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use optrace::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::lens_optimizer::prelude::*;
    pub use super::merit::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
