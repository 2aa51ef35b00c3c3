//! lens_optimizer::finite_diff — finite-difference gradients with
//! per-parameter steps.
//!
//! Purpose
//! -------
//! Approximate the gradient of the scalar merit cost with a step that is a
//! fixed fraction of each parameter's natural scale, using the `finitediff`
//! crate underneath.
//!
//! Key behaviors
//! -------------
//! - [`fd_scaling`] turns parameter scales into per-coordinate factors `k`
//!   such that `finitediff`'s fixed step in `w = x / k` is a step of
//!   `scale · diff_step` in `x`.
//! - [`scaled_gradient`] tries central differences first and falls back to
//!   forward differences, via [`run_fd_diff`], when an evaluation failed or
//!   the central estimate is not finite.
//!
//! Invariants & assumptions
//! ------------------------
//! - Any error raised by the objective during differencing is routed into
//!   the shared `closure_err` cell and returned as an [`OptError`] after
//!   the fallback also fails.
//! - Returned gradients satisfy [`validate_grad`].
//!
//! Conventions
//! -----------
//! - Gradients are with respect to parameter space `x`; chaining through
//!   bound transforms happens in the adapter.
use std::cell::RefCell;

use argmin::core::Error;
use finitediff::FiniteDiff;

use crate::optimization::{
    errors::OptResult,
    lens_optimizer::{
        types::{Grad, Theta},
        validation::validate_grad,
    },
};

/// Step `finitediff` takes in every coordinate.
fn base_step() -> f64 {
    f64::EPSILON.sqrt()
}

/// fd_scaling — coordinate factors that turn `finitediff`'s fixed step into
/// a step of `scale_i · diff_step` in parameter `i`.
///
/// Parameters
/// ----------
/// - `scales`: positive, finite per-parameter scales.
/// - `diff_step`: step as a fraction of scale.
///
/// Returns
/// -------
/// `k` with `k_i = scale_i · diff_step / √ε`.
pub fn fd_scaling(scales: &Theta, diff_step: f64) -> Theta {
    scales.mapv(|s| s * diff_step / base_step())
}

/// Forward-difference gradient of `func` at `theta`.
///
/// `func` reports failures by parking the error in `closure_err` and
/// returning `NaN`. The cell is cleared first; a parked error wins over the
/// numeric result.
///
/// # Errors
/// The parked error, or the [`validate_grad`] failure of the estimate.
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// scaled_gradient — gradient of `func` at `x` with step `k_i · √ε` per
/// coordinate.
///
/// Parameters
/// ----------
/// - `x`: point in parameter space.
/// - `k`: factors from [`fd_scaling`].
/// - `func`: scalar objective in parameter space; on failure it stores the
///   error in `closure_err` and returns `NaN`.
///
/// Returns
/// -------
/// `∂func/∂x` as a validated [`Grad`].
///
/// Errors
/// ------
/// - The first error captured from `func` on the forward-difference pass.
/// - [`OptError::InvalidGradient`](crate::optimization::errors::OptError::InvalidGradient)
///   if neither pass yields a finite gradient.
pub fn scaled_gradient<G: Fn(&Theta) -> f64>(
    x: &Theta, k: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    let w = x / k;
    let in_w = |w: &Theta| func(&(w * k));
    let central = w.central_diff(&in_w);
    let grad_w = if closure_err.borrow().is_some() || validate_grad(&central, w.len()).is_err() {
        run_fd_diff(&w, &in_w, closure_err)?
    } else {
        central
    };
    Ok(grad_w / k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use approx::assert_relative_eq;
    use argmin::core::ArgminError;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Scaled central differences on smooth objectives.
    // - The forward-difference fallback with and without closure errors.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Central differences in scaled coordinates reproduce the analytic
    // gradient of a quadratic whose coordinates differ by orders of
    // magnitude.
    //
    // Given
    // -----
    // - f(x) = (x₀ − 1)² + 1e-4 (x₁ − 300)², scales (1, 100).
    //
    // Expect
    // ------
    // - ∇f = (2 (x₀ − 1), 2e-4 (x₁ − 300)) within 1e-6 relative.
    fn scaled_gradient_matches_quadratic() {
        // Arrange
        let x = array![3.0, 100.0];
        let k = fd_scaling(&array![1.0, 100.0], 1e-2);
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |x: &Theta| (x[0] - 1.0).powi(2) + 1e-4 * (x[1] - 300.0).powi(2);

        // Act
        let g = scaled_gradient(&x, &k, &f, &closure_err).unwrap();

        // Assert
        assert_relative_eq!(g[0], 4.0, max_relative = 1e-6);
        assert_relative_eq!(g[1], -0.04, max_relative = 1e-6);
    }

    #[test]
    fn fd_scaling_sets_step_in_parameter_space() {
        let k = fd_scaling(&array![2.0], 1e-2);
        assert_relative_eq!(k[0] * f64::EPSILON.sqrt(), 2e-2, max_relative = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // An error raised on every evaluation survives both passes and comes
    // back as the original OptError.
    fn closure_errors_are_propagated() {
        // Arrange
        let x = array![1.0];
        let k = fd_scaling(&array![1.0], 1e-2);
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_: &Theta| {
            closure_err.replace(Some(OptError::EmptyBundle { index: 0 }.into()));
            f64::NAN
        };

        // Act
        let err = scaled_gradient(&x, &k, &f, &closure_err).unwrap_err();

        // Assert
        assert_eq!(err, OptError::EmptyBundle { index: 0 });
    }

    #[test]
    fn run_fd_diff_classifies_argmin_errors() {
        let theta: Theta = array![1.0];
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_: &Theta| {
            let argmin_err = ArgminError::NotImplemented { text: "fd test".to_string() };
            closure_err.replace(Some(argmin_err.into()));
            f64::NAN
        };

        let err = run_fd_diff(&theta, &f, &closure_err).unwrap_err();

        assert!(matches!(err, OptError::Solver { kind: "not implemented", .. }));
    }

    #[test]
    fn non_finite_gradient_yields_invalid_gradient() {
        let theta: Theta = array![0.0, 1.0];
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_x: &Theta| f64::NAN;

        let err = run_fd_diff(&theta, &f, &closure_err).unwrap_err();

        assert!(matches!(err, OptError::InvalidGradient { .. }));
    }
}
