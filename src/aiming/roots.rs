//! Root finders behind ray aiming.
//!
//! Purpose
//! -------
//! Solve the pupil-map equations used by the aiming solver: a 1-D secant
//! iteration (`roots::find_root_secant`) for the marginal rays and argmin's
//! Gauss–Newton method with a forward-difference Jacobian for the chief ray.
//!
//! Key behaviors
//! -------------
//! - Both solvers take fallible closures. The backends only see `f64` or
//!   argmin's boxed error, so the first [`AimError`] a closure raises is
//!   parked and returned in place of whatever the backend reports.
//! - Non-finite function values, a flat secant slope, or a singular Jacobian
//!   are [`AimError::StopNotReached`]; running out of iterations is
//!   [`AimError::NonConvergence`]. The two are never conflated.
//!
//! Conventions
//! -----------
//! - The secant tolerance is absolute, on both the residual and the step.
//! - The Gauss–Newton tolerance is on the change of `‖f(x)‖` between
//!   iterations; an exact zero stops the run immediately.
use std::cell::{Cell, RefCell};

use argmin::core::{Error, Executor, Jacobian, Operator, State, TerminationReason};
use argmin::solver::gaussnewton::GaussNewton;
use nalgebra::{DMatrix, DVector};
use roots::{SearchError, SimpleConvergency, find_root_secant};

use crate::aiming::errors::{AimError, AimResult};

fn finite_or_lost(value: f64) -> AimResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AimError::StopNotReached {
            reason: "Probe ray produced a non-finite pupil coordinate.",
        })
    }
}

/// secant — 1-D root of `f` from two starting points.
///
/// Parameters
/// ----------
/// - `f`: fallible scalar function.
/// - `x0`, `x1`: distinct starting points.
/// - `tol`: absolute tolerance on `|f|` and on the step.
/// - `max_iter`: maximum number of secant updates.
///
/// Errors
/// ------
/// - Errors returned by `f` are propagated unchanged.
/// - [`AimError::StopNotReached`] for non-finite values or a flat slope.
/// - [`AimError::NonConvergence`] after `max_iter` updates.
pub fn secant<F>(f: F, x0: f64, x1: f64, tol: f64, max_iter: usize) -> AimResult<f64>
where
    F: Fn(f64) -> AimResult<f64>,
{
    let closure_err: RefCell<Option<AimError>> = RefCell::new(None);
    let last = Cell::new(f64::NAN);
    let g = |x: f64| -> f64 {
        if closure_err.borrow().is_some() {
            return f64::NAN;
        }
        if !x.is_finite() {
            *closure_err.borrow_mut() = Some(flat());
            return f64::NAN;
        }
        match f(x).and_then(finite_or_lost) {
            Ok(value) => {
                last.set(value);
                value
            }
            Err(e) => {
                *closure_err.borrow_mut() = Some(e);
                f64::NAN
            }
        }
    };
    let mut convergency = SimpleConvergency { eps: tol, max_iter };
    let found = find_root_secant(x0, x1, &g, &mut convergency);

    if let Some(err) = closure_err.into_inner() {
        return Err(err);
    }
    found.map_err(|err| match err {
        SearchError::NoConvergency => {
            AimError::NonConvergence { iterations: max_iter, residual: last.get().abs() }
        }
        _ => flat(),
    })
}

fn flat() -> AimError {
    AimError::StopNotReached { reason: "Pupil coordinate is flat along the search axis." }
}

/// A square system `f(x) = 0` posed for argmin: `f` is the operator and the
/// Jacobian is a forward difference with step `step`.
struct SquareSystem<F> {
    f: F,
    step: f64,
}

impl<F> SquareSystem<F>
where
    F: Fn(&DVector<f64>) -> AimResult<DVector<f64>>,
{
    fn eval(&self, x: &DVector<f64>) -> AimResult<DVector<f64>> {
        let fx = (self.f)(x)?;
        for v in fx.iter() {
            finite_or_lost(*v)?;
        }
        Ok(fx)
    }
}

impl<F> Operator for SquareSystem<F>
where
    F: Fn(&DVector<f64>) -> AimResult<DVector<f64>>,
{
    type Param = DVector<f64>;
    type Output = DVector<f64>;

    fn apply(&self, x: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.eval(x)?)
    }
}

impl<F> Jacobian for SquareSystem<F>
where
    F: Fn(&DVector<f64>) -> AimResult<DVector<f64>>,
{
    type Param = DVector<f64>;
    type Jacobian = DMatrix<f64>;

    fn jacobian(&self, x: &Self::Param) -> Result<Self::Jacobian, Error> {
        let fx = self.eval(x)?;
        let mut jac = DMatrix::<f64>::zeros(fx.len(), x.len());
        for j in 0..x.len() {
            let mut xp = x.clone();
            xp[j] += self.step;
            let fp = self.eval(&xp)?;
            jac.set_column(j, &((fp - &fx) / self.step));
        }
        Ok(jac)
    }
}

/// Recover a closure's own error from argmin; anything else argmin raises
/// here comes from inverting `JᵀJ`.
fn own_or_singular(err: Error) -> AimError {
    err.downcast::<AimError>()
        .unwrap_or(AimError::StopNotReached { reason: "Pupil map Jacobian is singular." })
}

/// gauss_newton — root of a square system `f(x) = 0`.
///
/// Runs argmin's [`GaussNewton`] from `x0`. For a square, nonsingular
/// Jacobian each step is the Newton step `Δx = −J⁻¹ f(x)`. Converges when
/// `‖f(x)‖` is exactly zero or changes by less than `tol` in one step.
///
/// # Errors
/// - Errors returned by `f` are propagated unchanged.
/// - [`AimError::InvalidOption`] for a non-positive or NaN `tol`.
/// - [`AimError::StopNotReached`] for non-finite values or a singular
///   Jacobian.
/// - [`AimError::NonConvergence`] after `max_iter` steps.
pub fn gauss_newton<F>(
    f: F, x0: DVector<f64>, step: f64, tol: f64, max_iter: usize,
) -> AimResult<DVector<f64>>
where
    F: Fn(&DVector<f64>) -> AimResult<DVector<f64>>,
{
    if tol.is_nan() || tol <= 0.0 {
        return Err(AimError::InvalidOption {
            name: "chief_xtol",
            value: tol,
            reason: "must be positive",
        });
    }
    let solver = GaussNewton::new().with_tolerance(tol).map_err(own_or_singular)?;
    let result = Executor::new(SquareSystem { f, step }, solver)
        .configure(|state| state.param(x0).max_iters(max_iter as u64).target_cost(0.0))
        .run()
        .map_err(own_or_singular)?;

    let state = result.state();
    let reached = matches!(
        state.get_termination_reason(),
        Some(TerminationReason::SolverConverged | TerminationReason::TargetCostReached)
    );
    if !reached {
        return Err(AimError::NonConvergence { iterations: max_iter, residual: state.get_cost() });
    }
    state.get_best_param().cloned().ok_or(AimError::NonConvergence {
        iterations: max_iter,
        residual: state.get_cost(),
    })
}
