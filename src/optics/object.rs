//! The object: where ray batches are launched from.
//!
//! Purpose
//! -------
//! Map relative field heights and aiming coordinates to launch positions and
//! directions. The aiming solver only ever talks to the object through
//! [`Object::rays_to_height`], so the meaning of a launch coordinate depends
//! on the conjugate:
//!
//! - object at infinity (`radius == f64::INFINITY`): the field height picks
//!   the direction (fraction of `field_angle`), the launch coordinate is the
//!   `(x, y)` position in the object plane;
//! - finite object: the field height picks the position (fraction of
//!   `radius`), the launch coordinate is the `(x, y)` direction tangent.
use ndarray::{Array2, ArrayView2};

use crate::optics::{
    errors::{OpticsError, OpticsResult},
    material::Material,
    rays::Rays,
};

/// Launch coordinates of the four marginal rays, `+x, −x, +y, −y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marginals {
    pub px: [f64; 2],
    pub nx: [f64; 2],
    pub py: [f64; 2],
    pub ny: [f64; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Object half-height; `f64::INFINITY` for an object at infinity.
    pub radius: f64,
    /// Half field angle in radians, used when `radius` is infinite.
    pub field_angle: f64,
    /// Object-space medium.
    pub material: Material,
}

impl Object {
    /// An object at infinity filling `field_angle` (radians, half field).
    ///
    /// # Errors
    /// [`OpticsError::InvalidFieldAngle`] unless `0 ≤ field_angle < π/2`.
    pub fn infinite(field_angle: f64) -> OpticsResult<Self> {
        if !field_angle.is_finite()
            || !(0.0..std::f64::consts::FRAC_PI_2).contains(&field_angle)
        {
            return Err(OpticsError::InvalidFieldAngle { angle: field_angle });
        }
        Ok(Self { radius: f64::INFINITY, field_angle, material: Material::air() })
    }

    /// A finite object of half-height `radius`.
    pub fn finite(radius: f64) -> OpticsResult<Self> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(OpticsError::InvalidRadius {
                radius,
                reason: "Finite object height must be finite and non-negative.",
            });
        }
        Ok(Self { radius, field_angle: 0.0, material: Material::air() })
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn is_infinite(&self) -> bool {
        self.radius.is_infinite()
    }

    /// Launch state for each row `(x, y)` of `launch` at field `height`.
    ///
    /// # Errors
    /// [`OpticsError::LaunchShapeMismatch`] unless `launch` is `n × 2`.
    pub fn rays_to_height(
        &self, launch: ArrayView2<f64>, height: [f64; 2],
    ) -> OpticsResult<(Array2<f64>, Array2<f64>)> {
        if launch.ncols() != 2 {
            return Err(OpticsError::LaunchShapeMismatch { found: launch.dim() });
        }
        let n = launch.nrows();
        let mut positions = Array2::zeros((n, 3));
        let mut angles = Array2::zeros((n, 3));
        for (i, row) in launch.outer_iter().enumerate() {
            let (pos, tangent) = if self.is_infinite() {
                let tx = (height[0] * self.field_angle).tan();
                let ty = (height[1] * self.field_angle).tan();
                ([row[0], row[1]], [tx, ty])
            } else {
                ([height[0] * self.radius, height[1] * self.radius], [row[0], row[1]])
            };
            let norm = (tangent[0] * tangent[0] + tangent[1] * tangent[1] + 1.0).sqrt();
            positions[[i, 0]] = pos[0];
            positions[[i, 1]] = pos[1];
            angles[[i, 0]] = tangent[0] / norm;
            angles[[i, 1]] = tangent[1] / norm;
            angles[[i, 2]] = 1.0 / norm;
        }
        Ok((positions, angles))
    }

    /// Fill the pupil of field point `height` with a `count × count` grid.
    ///
    /// Grid nodes `(a, b) ∈ [−1, 1]²` outside the unit circle are dropped;
    /// the rest are mapped through the chief and marginal launch coordinates,
    /// linearly on each side of the chief, so `(±1, 0)` and `(0, ±1)` land
    /// exactly on the marginals. `count == 1` yields the chief ray alone.
    pub fn rays_for_point(
        &self, height: [f64; 2], chief: [f64; 2], marginals: &Marginals, count: usize,
    ) -> OpticsResult<(Array2<f64>, Array2<f64>)> {
        let nodes: Vec<f64> = match count {
            0 => Vec::new(),
            1 => vec![0.0],
            _ => (0..count).map(|i| -1.0 + 2.0 * i as f64 / (count - 1) as f64).collect(),
        };
        let mut launch = Vec::with_capacity(2 * nodes.len() * nodes.len());
        for &b in &nodes {
            for &a in &nodes {
                if a * a + b * b > 1.0 + 1e-12 {
                    continue;
                }
                let x = if a >= 0.0 {
                    chief[0] + a * (marginals.px[0] - chief[0])
                } else {
                    chief[0] - a * (marginals.nx[0] - chief[0])
                };
                let y = if b >= 0.0 {
                    chief[1] + b * (marginals.py[1] - chief[1])
                } else {
                    chief[1] - b * (marginals.ny[1] - chief[1])
                };
                launch.push(x);
                launch.push(y);
            }
        }
        let n = launch.len() / 2;
        let launch = Array2::from_shape_vec((n, 2), launch)
            .map_err(|_| OpticsError::LaunchShapeMismatch { found: (n, 2) })?;
        self.rays_to_height(launch.view(), height)
    }

    /// Enter object space: sets the medium index and end positions.
    pub fn propagate(&self, rays: &Rays) -> Rays {
        let mut out = rays.clone();
        out.refractive_index = self.material.refractive_index(rays.wavelength);
        out.end_positions = rays.positions.clone();
        out
    }
}
