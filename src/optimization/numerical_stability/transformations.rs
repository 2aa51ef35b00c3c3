//! Smooth maps between bounded parameter space and the unconstrained space
//! the solvers work in.
//!
//! # Provided items
//! - [`LOGIT_EPS`]: clamp applied to interval fractions before the logit so
//!   a start exactly on a bound maps to a finite point.
//! - [`Z_LIMIT`]: largest `|z|` at which a saturating map is evaluated.
//! - [`safe_softplus(x)`]: stable version of `ln(1 + exp(x))`,
//!   mapping ℝ → (0, ∞) without overflow.
//! - [`safe_softplus_inv(x)`]: inverse of softplus, mapping
//!   (0, ∞) → ℝ without catastrophic cancellation.
//! - [`safe_logistic(x)`]: `1 / (1 + exp(−x))` evaluated on the side that
//!   cannot overflow.
//! - [`BoundTransform`]: per-parameter choice of map, built from optional
//!   lower and upper bounds.
use crate::optimization::errors::{OptError, OptResult};

/// Smallest interval fraction (and distance from 1) passed to the logit.
pub const LOGIT_EPS: f64 = 1e-12;

/// Saturating maps are evaluated at `|z| ≤ Z_LIMIT`, where `dx/dz` is still
/// nonzero in double precision.
pub const Z_LIMIT: f64 = 30.0;

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// - For sufficiently large `x`, `softplus(x) ≈ x + ln1p(exp(-x)) ≈ x`.
/// - Otherwise, it falls back to `ln1p(exp(x))`.
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}

/// Stable inverse of softplus on `(0, ∞)`: `t = ln(exp(x) - 1)`.
///
/// - For sufficiently large `x`, `ln(exp(x) - 1) ≈ x`.
/// - Otherwise, it uses `ln(expm1(x))`.
pub fn safe_softplus_inv(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp_m1().ln() }
}

/// Logistic function `σ(x) = 1 / (1 + exp(−x))`.
///
/// The exponential is always taken of a non-positive argument.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Map from an unconstrained coordinate `z` to a bounded parameter `x`.
///
/// | variant            | `x(z)`                         |
/// |--------------------|--------------------------------|
/// | `Free`             | `z`                            |
/// | `Lower(lo)`        | `lo + softplus(z)`             |
/// | `Upper(hi)`        | `hi − softplus(z)`             |
/// | `Interval(lo, hi)` | `lo + (hi − lo) σ(z)`          |
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundTransform {
    Free,
    Lower(f64),
    Upper(f64),
    Interval(f64, f64),
}

impl BoundTransform {
    /// Pick the transform matching a parameter's bounds.
    ///
    /// Infinite bounds count as absent.
    ///
    /// # Errors
    /// [`OptError::InvalidBounds`] if a bound is NaN or `lower ≥ upper`.
    pub fn from_bounds(name: &str, lower: Option<f64>, upper: Option<f64>) -> OptResult<Self> {
        let invalid = || OptError::InvalidBounds {
            name: name.to_string(),
            lower: lower.unwrap_or(f64::NEG_INFINITY),
            upper: upper.unwrap_or(f64::INFINITY),
        };
        if lower.is_some_and(f64::is_nan) || upper.is_some_and(f64::is_nan) {
            return Err(invalid());
        }
        let lower = lower.filter(|v| v.is_finite());
        let upper = upper.filter(|v| v.is_finite());
        match (lower, upper) {
            (None, None) => Ok(BoundTransform::Free),
            (Some(lo), None) => Ok(BoundTransform::Lower(lo)),
            (None, Some(hi)) => Ok(BoundTransform::Upper(hi)),
            (Some(lo), Some(hi)) if lo < hi => Ok(BoundTransform::Interval(lo, hi)),
            _ => Err(invalid()),
        }
    }

    /// Bounded parameter value for unconstrained coordinate `z`.
    pub fn to_bounded(&self, z: f64) -> f64 {
        match *self {
            BoundTransform::Free => z,
            BoundTransform::Lower(lo) => lo + safe_softplus(z),
            BoundTransform::Upper(hi) => hi - safe_softplus(z),
            BoundTransform::Interval(lo, hi) => lo + (hi - lo) * safe_logistic(z),
        }
    }

    /// Unconstrained coordinate for parameter value `x`.
    ///
    /// Values on or beyond a bound are pulled just inside it first.
    pub fn to_unbounded(&self, x: f64) -> f64 {
        match *self {
            BoundTransform::Free => x,
            BoundTransform::Lower(lo) => safe_softplus_inv((x - lo).max(f64::MIN_POSITIVE)),
            BoundTransform::Upper(hi) => safe_softplus_inv((hi - x).max(f64::MIN_POSITIVE)),
            BoundTransform::Interval(lo, hi) => {
                let p = ((x - lo) / (hi - lo)).clamp(LOGIT_EPS, 1.0 - LOGIT_EPS);
                (p / (1.0 - p)).ln()
            }
        }
    }

    /// `z` pulled back to the side of [`Z_LIMIT`] where the map still has
    /// slope. NaN passes through.
    pub fn clamp(&self, z: f64) -> f64 {
        match *self {
            BoundTransform::Free => z,
            BoundTransform::Lower(_) | BoundTransform::Upper(_) => z.max(-Z_LIMIT),
            BoundTransform::Interval(..) => z.clamp(-Z_LIMIT, Z_LIMIT),
        }
    }

    /// `dx/dz` at `z`.
    pub fn derivative(&self, z: f64) -> f64 {
        match *self {
            BoundTransform::Free => 1.0,
            BoundTransform::Lower(_) => safe_logistic(z),
            BoundTransform::Upper(_) => -safe_logistic(z),
            BoundTransform::Interval(lo, hi) => {
                let s = safe_logistic(z);
                (hi - lo) * s * (1.0 - s)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ---------------------------------------------------------------------
    // Scope
    // -----
    // - Stable scalar transforms against their naive formulas on safe
    //   grids, and their tails.
    // - BoundTransform selection, inversion, range, and derivative.
    // ---------------------------------------------------------------------

    #[test]
    fn softplus_and_inverse_agree_with_naive_forms() {
        for x in [-5.0_f64, -0.5, 0.0, 0.7, 3.0, 15.0] {
            assert_relative_eq!(safe_softplus(x), (1.0 + x.exp()).ln(), max_relative = 1e-12);
            assert_relative_eq!(safe_softplus_inv(safe_softplus(x)), x, epsilon = 1e-9);
        }
        assert_eq!(safe_softplus(800.0), 800.0);
        assert!(safe_softplus(-800.0) >= 0.0);
    }

    #[test]
    fn logistic_is_stable_in_both_tails() {
        assert_relative_eq!(safe_logistic(0.0), 0.5);
        assert_relative_eq!(safe_logistic(2.0) + safe_logistic(-2.0), 1.0, epsilon = 1e-15);
        assert_eq!(safe_logistic(1000.0), 1.0);
        assert_eq!(safe_logistic(-1000.0), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Each bound combination selects the matching transform, infinite
    // bounds are ignored, and inconsistent bounds are rejected.
    fn from_bounds_selects_transform() {
        assert_eq!(BoundTransform::from_bounds("a", None, None).unwrap(), BoundTransform::Free);
        assert_eq!(
            BoundTransform::from_bounds("a", Some(1.0), Some(f64::INFINITY)).unwrap(),
            BoundTransform::Lower(1.0)
        );
        assert_eq!(
            BoundTransform::from_bounds("a", None, Some(2.0)).unwrap(),
            BoundTransform::Upper(2.0)
        );
        assert_eq!(
            BoundTransform::from_bounds("a", Some(0.0), Some(10.0)).unwrap(),
            BoundTransform::Interval(0.0, 10.0)
        );

        let err = BoundTransform::from_bounds("gap", Some(3.0), Some(3.0)).unwrap_err();
        assert!(matches!(err, OptError::InvalidBounds { .. }));
        assert!(BoundTransform::from_bounds("gap", Some(f64::NAN), None).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Interior values round-trip, images stay inside the bounds, and the
    // analytic derivative matches a central difference.
    //
    // Given
    // -----
    // - One transform of each kind and a handful of interior points.
    //
    // Expect
    // ------
    // - `to_bounded(to_unbounded(x)) ≈ x`.
    // - `derivative(z)` within 1e-6 relative of the difference quotient.
    fn transforms_invert_and_differentiate() {
        let cases = [
            (BoundTransform::Free, -3.0),
            (BoundTransform::Lower(1.0), 1.5),
            (BoundTransform::Upper(2.0), -4.0),
            (BoundTransform::Interval(0.0, 10.0), 1.0),
        ];
        for (t, x) in cases {
            // Act
            let z = t.to_unbounded(x);
            let h = 1e-6;
            let fd = (t.to_bounded(z + h) - t.to_bounded(z - h)) / (2.0 * h);

            // Assert
            assert_relative_eq!(t.to_bounded(z), x, epsilon = 1e-9);
            assert_relative_eq!(t.derivative(z), fd, max_relative = 1e-6);
        }
    }

    #[test]
    fn values_on_a_bound_map_inside() {
        let t = BoundTransform::Interval(0.0, 10.0);
        let z = t.to_unbounded(0.0);
        assert!(z.is_finite());
        let x = t.to_bounded(z);
        assert!(x > 0.0 && x < 1e-9);

        let lower = BoundTransform::Lower(1.0);
        assert!(lower.to_unbounded(0.5).is_finite());
        assert!(lower.to_bounded(-5.0) > 1.0);
    }

    #[test]
    // Purpose
    // -------
    // Clamped coordinates keep a nonzero slope for every saturating map and
    // leave the unsaturated direction alone.
    fn clamp_stops_before_the_flat_tail() {
        let interval = BoundTransform::Interval(0.0, 10.0);
        assert_eq!(interval.clamp(1e5), Z_LIMIT);
        assert_eq!(interval.clamp(-1e5), -Z_LIMIT);
        assert_eq!(interval.clamp(1.5), 1.5);
        assert!(interval.derivative(interval.clamp(1e5)) > 0.0);
        assert!(interval.derivative(interval.clamp(-1e5)) > 0.0);

        let lower = BoundTransform::Lower(1.0);
        assert_eq!(lower.clamp(1e5), 1e5);
        assert!(lower.derivative(lower.clamp(-1e5)) > 0.0);
        assert!(BoundTransform::Upper(2.0).derivative(-Z_LIMIT) < 0.0);
        assert_eq!(BoundTransform::Free.clamp(-1e5), -1e5);
        assert!(interval.clamp(f64::NAN).is_nan());
    }
}
