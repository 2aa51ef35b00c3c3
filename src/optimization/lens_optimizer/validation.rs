//! Validation helpers for the lens optimizer.
//!
//! - **Option checks**: [`verify_tol_grad`], [`verify_tol_cost`],
//!   [`verify_penalty`], [`verify_diff_step`] ensure numeric settings are
//!   finite and strictly positive.
//! - **Gradient validation**: [`validate_grad`] enforces correct dimension
//!   and finite entries.
//! - **Results**: [`validate_best`] ensures a best vector exists and is
//!   finite; [`validate_value`] checks scalar costs.
use crate::optimization::{
    errors::{OptError, OptResult},
    lens_optimizer::types::{Grad, Theta},
};

fn positive_finite(value: f64) -> Result<(), &'static str> {
    if !value.is_finite() {
        return Err("Value must be finite.");
    }
    if value <= 0.0 {
        return Err("Value must be positive.");
    }
    Ok(())
}

/// Validate the optional gradient‐norm tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        positive_finite(tol).map_err(|reason| OptError::InvalidTolGrad { tol, reason })?;
    }
    Ok(())
}

/// Validate the optional cost‐change tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolCost`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        positive_finite(tol).map_err(|reason| OptError::InvalidTolCost { tol, reason })?;
    }
    Ok(())
}

/// # Errors
/// Returns [`OptError::InvalidPenalty`] if the weight is non-finite or ≤ 0.0.
pub fn verify_penalty(value: f64) -> OptResult<()> {
    positive_finite(value).map_err(|reason| OptError::InvalidPenalty { value, reason })
}

/// # Errors
/// Returns [`OptError::InvalidDiffStep`] if the step is non-finite or ≤ 0.0.
pub fn verify_diff_step(value: f64) -> OptResult<()> {
    positive_finite(value).map_err(|reason| OptError::InvalidDiffStep { value, reason })
}

/// Validate a gradient vector against dimension and finiteness.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if length does not match `dim`.
/// - [`OptError::InvalidGradient`] with the index/value/reason of the first
///   offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate and unwrap the best vector reported by the solver.
///
/// # Errors
/// - [`OptError::MissingBest`] if no vector was provided.
/// - [`OptError::InvalidBest`] if any element is non-finite.
pub fn validate_best(best: Option<Theta>) -> OptResult<Theta> {
    let best = best.ok_or(OptError::MissingBest)?;
    for (index, &value) in best.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidBest {
                index,
                value,
                reason: "Best parameters must be finite.",
            });
        }
    }
    Ok(best)
}

/// Validate that a scalar cost is finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn option_checks_reject_non_positive_and_non_finite() {
        assert!(verify_tol_grad(None).is_ok());
        assert!(verify_tol_grad(Some(1e-8)).is_ok());
        assert_eq!(
            verify_tol_cost(Some(0.0)).unwrap_err(),
            OptError::InvalidTolCost { tol: 0.0, reason: "Value must be positive." }
        );
        assert!(matches!(verify_penalty(f64::INFINITY), Err(OptError::InvalidPenalty { .. })));
        assert!(matches!(verify_diff_step(-1e-3), Err(OptError::InvalidDiffStep { .. })));
    }

    #[test]
    fn gradient_and_best_validation() {
        assert!(validate_grad(&array![1.0, 2.0], 2).is_ok());
        assert_eq!(
            validate_grad(&array![1.0], 2).unwrap_err(),
            OptError::GradientDimMismatch { expected: 2, found: 1 }
        );
        assert!(matches!(
            validate_grad(&array![1.0, f64::NAN], 2),
            Err(OptError::InvalidGradient { index: 1, .. })
        ));

        assert_eq!(validate_best(None).unwrap_err(), OptError::MissingBest);
        assert!(matches!(
            validate_best(Some(array![f64::INFINITY])),
            Err(OptError::InvalidBest { index: 0, .. })
        ));
        assert_eq!(validate_best(Some(array![3.0])).unwrap(), array![3.0]);
        assert!(validate_value(f64::NAN).is_err());
    }
}
