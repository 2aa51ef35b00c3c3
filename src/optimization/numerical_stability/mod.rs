//! numerical_stability — smooth bound handling for the lens optimizer.
//!
//! Purpose
//! -------
//! Let unconstrained solvers (L-BFGS, Nelder–Mead) respect per-parameter
//! bounds by optimizing over a reparameterized coordinate `z` whose image
//! under a smooth map always lies inside the bounds.
//!
//! Key behaviors
//! -------------
//! - Provide stable scalar transforms (`safe_softplus`, its inverse, and
//!   `safe_logistic`) that neither overflow nor lose precision in the tails.
//! - Build a [`BoundTransform`] per parameter from its optional bounds and
//!   expose the forward map, its inverse, and `dx/dz` for chaining
//!   finite-difference gradients.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every finite `z` maps strictly inside the bounds (up to rounding at
//!   extreme `z`).
//! - Inverting a value on or beyond a bound clamps it inside first, so a
//!   starting design that sits on a bound still yields a finite `z`.
//!
//! Conventions
//! -----------
//! - This module never logs or performs I/O; it is pure numerical helpers
//!   suitable for use inside cost evaluations.

pub mod transformations;

pub use self::transformations::{
    BoundTransform, LOGIT_EPS, safe_logistic, safe_softplus, safe_softplus_inv,
};

pub mod prelude {
    pub use super::transformations::{
        BoundTransform, LOGIT_EPS, safe_logistic, safe_softplus, safe_softplus_inv,
    };
}
