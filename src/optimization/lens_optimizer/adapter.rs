//! Adapter that exposes a [`MeritFunction`] as an `argmin` problem.
//!
//! The solver works in an unconstrained coordinate `z`; each entry maps to
//! its parameter through a [`BoundTransform`], so bounds hold for every
//! trial the solver proposes. Constraints enter the scalar cost as a
//! quadratic penalty. No analytic gradient exists, so the gradient is a
//! finite difference in parameter space chained through `dx/dz`.
//!
//! Saturating maps go flat for large `|z|`, which stalls line searches that
//! step far along a direction. Coordinates past [`Z_LIMIT`] are clamped
//! before mapping and pay a quadratic wall `(z − clamp(z))²` instead, so
//! the cost keeps a slope pointing back towards the feasible region.
use std::cell::RefCell;

use argmin::core::{CostFunction, Error, Gradient};

use crate::optimization::{
    errors::{OptError, OptResult},
    lens_optimizer::{
        finite_diff::{fd_scaling, scaled_gradient},
        traits::OptimizeOptions,
        types::{Cost, Grad, Theta},
        validation::validate_value,
    },
    merit::merit_function::MeritFunction,
    numerical_stability::transformations::{BoundTransform, Z_LIMIT},
};

/// Bridges a [`MeritFunction`] to `argmin`'s `CostFunction` and `Gradient`.
///
/// - `CostFunction::cost(z)` returns
///   `‖F(x)‖² + penalty · (‖h(x)‖² + ‖max(0, g(x))‖²)` at `x = x(z)`, plus
///   the saturation wall.
/// - `Gradient::gradient(z)` returns a finite-difference estimate of its
///   derivative with respect to `z`.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a> {
    merit_fn: MeritFunction<'a>,
    transforms: Vec<BoundTransform>,
    scales: Theta,
    fd_scaling: Theta,
    penalty: f64,
}

impl<'a> ArgMinAdapter<'a> {
    /// Construct an adapter from a bound merit function and run options.
    ///
    /// # Errors
    /// [`OptError::InvalidBounds`] for inconsistent parameter bounds.
    pub fn new(merit_fn: MeritFunction<'a>, opts: &OptimizeOptions) -> OptResult<Self> {
        let parameters = merit_fn.merit().parameters();
        let transforms = parameters
            .iter()
            .map(|p| {
                let (lower, upper) = p.bounds();
                BoundTransform::from_bounds(p.name(), lower, upper)
            })
            .collect::<OptResult<Vec<_>>>()?;
        let scales: Theta = parameters.iter().map(|p| p.scale()).collect();
        let fd_scaling = fd_scaling(&scales, opts.diff_step);
        Ok(Self { merit_fn, transforms, scales, fd_scaling, penalty: opts.penalty })
    }

    pub fn merit_fn(&self) -> &MeritFunction<'a> {
        &self.merit_fn
    }

    pub fn transforms(&self) -> &[BoundTransform] {
        &self.transforms
    }

    /// Parameter vector for solver coordinates `z`, clamped to [`Z_LIMIT`].
    pub fn to_bounded(&self, z: &Theta) -> Theta {
        z.iter().zip(&self.transforms).map(|(&zi, t)| t.to_bounded(t.clamp(zi))).collect()
    }

    /// Solver coordinates for parameter vector `x`, never past [`Z_LIMIT`].
    pub fn to_unbounded(&self, x: &Theta) -> Theta {
        x.iter().zip(&self.transforms).map(|(&xi, t)| t.clamp(t.to_unbounded(xi))).collect()
    }

    /// `Σ (z − clamp(z))²`; zero inside the limit.
    pub fn wall(&self, z: &Theta) -> Cost {
        z.iter().zip(&self.transforms).map(|(&zi, t)| (zi - t.clamp(zi)).powi(2)).sum()
    }

    /// Length in `z` of one parameter scale at `z`, at most [`Z_LIMIT`]; the
    /// initial simplex edge for Nelder–Mead.
    pub fn unit_steps(&self, z: &Theta) -> Theta {
        z.iter()
            .zip(&self.transforms)
            .zip(&self.scales)
            .map(|((&zi, t), &scale)| {
                let slope = t.derivative(zi).abs();
                if slope > 0.0 { (scale / slope).min(Z_LIMIT) } else { scale }
            })
            .collect()
    }

    /// Penalized cost at parameter vector `x`.
    ///
    /// # Errors
    /// - Anything the merit evaluation raises.
    /// - [`OptError::NonFiniteCost`] if the cost is NaN or infinite.
    pub fn cost_at(&self, x: &Theta) -> OptResult<Cost> {
        let cost = self.merit_fn.evaluate(x)?.penalized_cost(self.penalty);
        validate_value(cost)?;
        Ok(cost)
    }
}

impl CostFunction for ArgMinAdapter<'_> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, z: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.cost_at(&self.to_bounded(z))? + self.wall(z))
    }
}

impl Gradient for ArgMinAdapter<'_> {
    type Param = Theta;
    type Gradient = Grad;

    /// Finite-difference gradient of the cost at `z`.
    ///
    /// The FD closure must return `f64`, so we can’t use `?` inside it; we
    /// capture the first error in `closure_err` and return `NaN` from the
    /// closure. [`scaled_gradient`] turns a captured error back into a real
    /// one (after retrying with forward differences).
    fn gradient(&self, z: &Self::Param) -> Result<Self::Gradient, Error> {
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let cost_func = |x: &Theta| -> f64 {
            match self.cost_at(x) {
                Ok(val) => val,
                Err(e) => {
                    let mut slot = closure_err.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(e.into());
                    }
                    f64::NAN
                }
            }
        };
        let x = self.to_bounded(z);
        let grad_x = scaled_gradient(&x, &self.fd_scaling, &cost_func, &closure_err)?;
        let grad: Grad = z
            .iter()
            .zip(&self.transforms)
            .zip(grad_x.iter())
            .map(|((&zi, t), &gx)| {
                let zc = t.clamp(zi);
                if zc == zi { gx * t.derivative(zi) } else { 2.0 * (zi - zc) }
            })
            .collect();
        if let Some((index, &value)) = grad.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            }
            .into());
        }
        Ok(grad)
    }
}
