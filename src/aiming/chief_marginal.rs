//! Chief and marginal ray aiming.
//!
//! Purpose
//! -------
//! Turn an object-space field point into launch coordinates that fill the
//! aperture stop: the chief ray through the stop centre and the four
//! marginal rays through the stop edge along `±x` and `±y`.
//!
//! Key behaviors
//! -------------
//! - The single function being solved is the pupil map `(x, y) ↦ stop-plane
//!   coordinates / stop radius` of one exact ray launched at `(x, y)`.
//! - Paraxial strategies extrapolate linearly from probe evaluations;
//!   exact strategies iterate [`gauss_newton`] (chief) or [`secant`]
//!   (marginals).
//! - [`ray_bundle`] aims and then fills the pupil with a ray grid.
//!
//! Invariants & assumptions
//! ------------------------
//! - Exactly one aperture stop; checked before any ray is traced.
//! - Marginals are full 2-vectors: the coordinate on the other axis is the
//!   chief value.
use std::cell::RefCell;

use nalgebra::DVector;
use ndarray::array;

use crate::{
    aiming::{
        errors::{AimError, AimResult},
        options::{AimOptions, AimStrategy},
        roots::{gauss_newton, secant},
    },
    optics::{object::Marginals, rays::Rays},
    system::system::System,
};

/// Aimed launch coordinates for one field point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimSolution {
    pub chief: [f64; 2],
    pub marginals: Marginals,
}

/// The pupil map for one field height: launch `(x, y)` to normalized
/// stop-plane coordinates.
struct PupilMap<'a> {
    system: &'a System,
    height: [f64; 2],
    rays: RefCell<Rays>,
}

impl PupilMap<'_> {
    fn stop_for_pos(&self, x: f64, y: f64) -> AimResult<[f64; 2]> {
        let (positions, angles) =
            self.system.object.rays_to_height(array![[x, y]].view(), self.height)?;
        let mut rays = self.rays.borrow_mut();
        rays.set_launch(positions, angles)?;
        let at_stop = self.system.height_at_aperture(&rays)?;
        let (px, py) = (at_stop[[0, 0]], at_stop[[0, 1]]);
        if !px.is_finite() || !py.is_finite() {
            return Err(AimError::StopNotReached {
                reason: "Probe ray missed a surface before the stop.",
            });
        }
        Ok([px, py])
    }
}

/// Solve for the chief and marginal launch coordinates at field `height`.
///
/// `template` supplies the wavelength; its ray arrays are ignored.
///
/// # Errors
/// - [`AimError::Trace`] with [`crate::system::TraceError::ApertureCount`]
///   unless the chain has exactly one stop.
/// - [`AimError::StopNotReached`] / [`AimError::NonConvergence`] from the
///   exact strategies.
pub fn chief_and_marginal(
    system: &System, height: [f64; 2], template: &Rays, opts: &AimOptions,
) -> AimResult<AimSolution> {
    system.stop_index()?;
    let map =
        PupilMap { system, height, rays: RefCell::new(Rays::new(template.wavelength, height)) };
    let d = opts.probe_step;

    let chief = match opts.chief {
        AimStrategy::Paraxial => {
            let f0 = map.stop_for_pos(0.0, 0.0)?;
            let fd = map.stop_for_pos(d, d)?;
            [extrapolate(0.0, d, f0[0], fd[0], 0.0)?, extrapolate(0.0, d, f0[1], fd[1], 0.0)?]
        }
        AimStrategy::Exact => {
            let root = gauss_newton(
                |p: &DVector<f64>| {
                    let [hx, hy] = map.stop_for_pos(p[0], p[1])?;
                    Ok(DVector::from_vec(vec![hx, hy]))
                },
                DVector::zeros(2),
                d,
                opts.chief_xtol,
                opts.max_iter,
            )?;
            [root[0], root[1]]
        }
    };

    let marginals = match opts.marginal {
        AimStrategy::Paraxial => {
            let f0 = map.stop_for_pos(chief[0], chief[1])?;
            let fd = map.stop_for_pos(chief[0] + d, chief[1] + d)?;
            let slope = [fd[0] - f0[0], fd[1] - f0[1]];
            if slope[0] == 0.0 || slope[1] == 0.0 {
                return Err(AimError::StopNotReached {
                    reason: "Pupil map has zero slope at the chief ray.",
                });
            }
            let dm = [d / slope[0], d / slope[1]];
            Marginals {
                px: [chief[0] + dm[0], chief[1]],
                nx: [chief[0] - dm[0], chief[1]],
                py: [chief[0], chief[1] + dm[1]],
                ny: [chief[0], chief[1] - dm[1]],
            }
        }
        AimStrategy::Exact => {
            let (tol, max_iter) = (opts.marginal_tol, opts.max_iter);
            let along_x = |target: f64, sign: f64| {
                let x0 = chief[0] + sign * d;
                let f = |x: f64| -> AimResult<f64> {
                    Ok(map.stop_for_pos(x, chief[1])?[0] - target)
                };
                secant(f, x0, x0 + sign * d, tol, max_iter)
            };
            let px = along_x(1.0, 1.0)?;
            let nx = along_x(-1.0, -1.0)?;
            let along_y = |target: f64, sign: f64| {
                let y0 = chief[1] + sign * d;
                let f = |y: f64| -> AimResult<f64> {
                    Ok(map.stop_for_pos(chief[0], y)?[1] - target)
                };
                secant(f, y0, y0 + sign * d, tol, max_iter)
            };
            let py = along_y(1.0, 1.0)?;
            let ny = along_y(-1.0, -1.0)?;
            Marginals {
                px: [px, chief[1]],
                nx: [nx, chief[1]],
                py: [chief[0], py],
                ny: [chief[0], ny],
            }
        }
    };

    Ok(AimSolution { chief, marginals })
}

/// Zero of the line through `(x0, f0)` and `(x1, f1)`, shifted to hit
/// `target`.
fn extrapolate(x0: f64, x1: f64, f0: f64, f1: f64, target: f64) -> AimResult<f64> {
    if f1 == f0 {
        return Err(AimError::StopNotReached { reason: "Pupil map has zero slope at the probe." });
    }
    Ok(x0 + (target - f0) * (x1 - x0) / (f1 - f0))
}

/// Aim at field `height` and fill the pupil with a `count × count` grid
/// clipped to the unit circle.
///
/// # Errors
/// As [`chief_and_marginal`].
pub fn ray_bundle(
    system: &System, wavelength: f64, height: [f64; 2], count: usize, opts: &AimOptions,
) -> AimResult<Rays> {
    let rays = Rays::new(wavelength, height);
    let AimSolution { chief, marginals } = chief_and_marginal(system, height, &rays, opts)?;
    let (positions, angles) = system.object.rays_for_point(height, chief, &marginals, count)?;
    Ok(rays.with_launch(positions, angles)?)
}
