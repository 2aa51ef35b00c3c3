//! merit — design variables, demerits, and constraints.
//!
//! Purpose
//! -------
//! Describe *what* a lens optimization should change and *what* it should
//! minimize, independently of the solver that does it.
//!
//! Key behaviors
//! -------------
//! - [`Parameter`], [`Demerit`], [`Constraint`]: the object-safe seams a
//!   caller implements (or fills with closures via [`FnParameter`],
//!   [`FnDemerit`], [`FnConstraint`]).
//! - Concrete building blocks: [`Curvature`], [`Spacing`], [`FocalLength`],
//!   [`RmsSpot`], [`MinSpacing`].
//! - [`Merit`] owns the pieces; [`MeritFunction`] binds them to a template
//!   system and ray bundles and evaluates `F(x)`, `h(x)`, `g(x)`.
//!
//! Conventions
//! -----------
//! - Inequality constraints follow `g(x) ≤ 0`.
//! - Residuals carry their demerit weight; the solver squares them.

pub mod constraints;
pub mod demerits;
pub mod merit_function;
pub mod parameters;
pub mod traits;

pub use self::constraints::{FnConstraint, MinSpacing};
pub use self::demerits::{FnDemerit, FocalLength, RmsSpot};
pub use self::merit_function::{Evaluation, Merit, MeritFunction};
pub use self::parameters::{Curvature, FnParameter, Spacing, Target};
pub use self::traits::{Constraint, ConstraintKind, Demerit, Parameter};

pub mod prelude {
    pub use super::constraints::{FnConstraint, MinSpacing};
    pub use super::demerits::{FnDemerit, FocalLength, RmsSpot};
    pub use super::merit_function::{Merit, MeritFunction};
    pub use super::parameters::{Curvature, FnParameter, Spacing, Target};
    pub use super::traits::{Constraint, ConstraintKind, Demerit, Parameter};
}
