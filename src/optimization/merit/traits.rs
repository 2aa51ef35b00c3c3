//! Collaborator seams of the merit layer.
//!
//! - [`Parameter`]: one scalar degree of freedom of a [`System`].
//! - [`Demerit`]: a residual vector to be driven towards zero.
//! - [`Constraint`]: a residual vector held at zero (equality) or at or
//!   below zero (inequality).
//!
//! All three are object-safe and stored boxed inside a
//! [`Merit`](crate::optimization::merit::Merit).
use ndarray::Array1;

use crate::{
    optics::rays::Rays,
    optimization::errors::OptResult,
    system::{paraxial::ParaxialTrace, system::System},
};

/// One scalar design variable.
///
/// Required:
/// - `name`: label used in error messages.
/// - `get_value` / `set_value`: read and write the variable on a system.
///
/// Optional:
/// - `bounds`: `(lower, upper)`, either side `None` for unbounded.
/// - `scale`: typical magnitude of a meaningful change; sets the
///   finite-difference step and the initial Nelder–Mead simplex.
/// - `check`: target validation, called once before optimization.
pub trait Parameter: std::fmt::Debug {
    fn name(&self) -> &str;

    fn get_value(&self, system: &System) -> OptResult<f64>;

    fn set_value(&self, system: &mut System, value: f64) -> OptResult<()>;

    fn bounds(&self) -> (Option<f64>, Option<f64>) {
        (None, None)
    }

    fn scale(&self) -> f64 {
        1.0
    }

    fn check(&self, system: &System) -> OptResult<()> {
        self.get_value(system).map(|_| ())
    }
}

/// A weighted residual vector evaluated on a traced trial system.
///
/// `rays` holds the image-plane batches, one per bundle, in the order the
/// bundles were handed to the optimizer.
pub trait Demerit: std::fmt::Debug {
    fn name(&self) -> &str;

    fn evaluate(
        &self, system: &System, paraxial: &ParaxialTrace, rays: &[Rays],
    ) -> OptResult<Array1<f64>>;

    fn weight(&self) -> f64 {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// `h(x) = 0`
    Equality,
    /// `g(x) ≤ 0`
    Inequality,
}

pub trait Constraint: std::fmt::Debug {
    fn name(&self) -> &str;

    fn evaluate(&self, system: &System) -> OptResult<Array1<f64>>;

    fn kind(&self) -> ConstraintKind;
}
