//! lens_optimizer::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the numeric types and solver aliases used by the lens
//! optimizer so the rest of the code stays agnostic to `ndarray` and
//! argmin generics.
//!
//! Invariants & assumptions
//! ------------------------
//! - Solvers see `Theta` in the unconstrained coordinate `z`; merit
//!   functions see it in parameter space `x`. The two have the same length.
//! - `Cost` is the scalar penalized sum of squares, never negative.
//!
//! Conventions
//! -----------
//! - `DEFAULT_LBFGS_MEM` is the L-BFGS history size unless overridden in
//!   `OptimizeOptions`.
//! - `DEFAULT_DIFF_STEP`, `DEFAULT_PENALTY`, and `DEFAULT_TIMEOUT_SECS`
//!   are the option defaults.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    neldermead::NelderMead,
    quasinewton::LBFGS,
};
use ndarray::Array1;
use std::collections::HashMap;

/// Parameter vector, in either parameter or unconstrained space.
pub type Theta = Array1<f64>;

/// Gradient of the scalar cost, matching the shape of `Theta`.
pub type Grad = Array1<f64>;

/// Penalized merit value minimized by every solver.
pub type Cost = f64;

/// Flattened residual vector of demerits or constraints.
pub type Residuals = Array1<f64>;

/// argmin's evaluation counters, keyed by counter name (`"cost_count"`,
/// `"gradient_count"`).
pub type FnEvalMap = HashMap<String, u64>;

/// L-BFGS history length used when `OptimizeOptions::lbfgs_mem` is `None`.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Default finite-difference step, relative to each parameter's scale.
pub const DEFAULT_DIFF_STEP: f64 = 1e-2;

/// Default quadratic penalty weight on constraint violations.
pub const DEFAULT_PENALTY: f64 = 1e3;

/// Default wall-clock budget of one run.
pub const DEFAULT_TIMEOUT_SECS: u64 = 2000;

/// Hager–Zhang line search over `Theta`.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// More–Thuente line search over `Theta`.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// L-BFGS using [`HagerZhangLS`].
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

/// L-BFGS using [`MoreThuenteLS`].
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;

/// Derivative-free simplex solver.
pub type NelderMeadSolver = NelderMead<Theta, Cost>;
