//! Configuration for chief/marginal ray aiming.
//!
//! The probe step and the two tolerances are plain configuration. The
//! defaults reproduce the classic behavior: a coarse tolerance for the
//! 2-D chief solve and a tight absolute tolerance for the 1-D marginal
//! solves.
use std::str::FromStr;

use crate::aiming::errors::{AimError, AimResult};

pub const DEFAULT_PROBE_STEP: f64 = 1e-3;
pub const DEFAULT_CHIEF_XTOL: f64 = 1e-2;
pub const DEFAULT_MARGINAL_TOL: f64 = 1.48e-8;
pub const DEFAULT_MAX_ITER: usize = 50;

/// How a chief or marginal launch coordinate is found.
///
/// - `Paraxial`: one linear extrapolation from probe evaluations; cheap and
///   accurate only near the axis.
/// - `Exact`: iterate a root finder on the real-ray pupil map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AimStrategy {
    #[default]
    Paraxial,
    Exact,
}

impl FromStr for AimStrategy {
    type Err = AimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "paraxial" => Ok(AimStrategy::Paraxial),
            "exact" => Ok(AimStrategy::Exact),
            _ => Err(AimError::InvalidOption {
                name: "strategy",
                value: f64::NAN,
                reason: "Valid options are case insensitive 'Paraxial' or 'Exact'.",
            }),
        }
    }
}

/// Ray-aiming options.
///
/// Fields
/// ------
/// - `probe_step`: launch-coordinate step `d` used for extrapolation, for
///   the forward-difference Jacobian, and to seed the secant solves.
/// - `chief_xtol`: tolerance on the change of the pupil residual norm
///   between steps of the exact chief solve.
/// - `marginal_tol`: absolute tolerance on the residual and the step of the
///   exact marginal solves.
/// - `max_iter`: iteration budget per root find.
/// - `chief`, `marginal`: strategy per ray family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimOptions {
    pub probe_step: f64,
    pub chief_xtol: f64,
    pub marginal_tol: f64,
    pub max_iter: usize,
    pub chief: AimStrategy,
    pub marginal: AimStrategy,
}

impl AimOptions {
    /// Construct validated options.
    ///
    /// # Errors
    /// [`AimError::InvalidOption`] if a step or tolerance is non-finite or
    /// not strictly positive, or if `max_iter == 0`.
    pub fn new(
        probe_step: f64, chief_xtol: f64, marginal_tol: f64, max_iter: usize, chief: AimStrategy,
        marginal: AimStrategy,
    ) -> AimResult<Self> {
        for (name, value) in
            [("probe_step", probe_step), ("chief_xtol", chief_xtol), ("marginal_tol", marginal_tol)]
        {
            if !value.is_finite() || value <= 0.0 {
                return Err(AimError::InvalidOption {
                    name,
                    value,
                    reason: "Must be finite and strictly positive.",
                });
            }
        }
        if max_iter == 0 {
            return Err(AimError::InvalidOption {
                name: "max_iter",
                value: 0.0,
                reason: "Must be greater than zero.",
            });
        }
        Ok(Self { probe_step, chief_xtol, marginal_tol, max_iter, chief, marginal })
    }

    /// Default tolerances with both families solved on real rays.
    pub fn exact() -> Self {
        Self { chief: AimStrategy::Exact, marginal: AimStrategy::Exact, ..Self::default() }
    }
}

impl Default for AimOptions {
    fn default() -> Self {
        Self {
            probe_step: DEFAULT_PROBE_STEP,
            chief_xtol: DEFAULT_CHIEF_XTOL,
            marginal_tol: DEFAULT_MARGINAL_TOL,
            max_iter: DEFAULT_MAX_ITER,
            chief: AimStrategy::Paraxial,
            marginal: AimStrategy::Paraxial,
        }
    }
}
