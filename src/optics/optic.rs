//! Surface geometry seam.
//!
//! The tracing core never evaluates sag equations itself; it asks an
//! [`Optic`] where a ray meets the surface and what the surface normal is
//! there. [`Spherical`] is the reference implementation (a plane when the
//! curvature is zero) and is what the element constructors use by default.
//!
//! All coordinates are local to the element vertex, with `+z` along the
//! optical axis towards the image.
use std::fmt;

/// Geometry of a single rotationally symmetric surface.
pub trait Optic: fmt::Debug + Send + Sync {
    /// Vertex curvature `1/R`; zero for a plane.
    fn curvature(&self) -> f64;

    fn set_curvature(&mut self, curvature: f64);

    /// Distance `t ≥ 0` along the unit `direction` from `position` to the
    /// surface, or `None` if the ray misses it.
    fn intersect(&self, position: [f64; 3], direction: [f64; 3]) -> Option<f64>;

    /// Unit surface normal at `point`, oriented towards `+z` at the vertex.
    fn normal(&self, point: [f64; 3]) -> [f64; 3];

    /// Mirror the surface for a reversed chain.
    fn revert(&mut self);

    fn clone_box(&self) -> Box<dyn Optic>;
}

impl Clone for Box<dyn Optic> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Sphere through the vertex with curvature `c`: `c/2·(x² + y² + z²) = z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub curvature: f64,
}

impl Spherical {
    pub fn new(curvature: f64) -> Self {
        Self { curvature }
    }

    pub fn flat() -> Self {
        Self { curvature: 0.0 }
    }
}

impl Optic for Spherical {
    fn curvature(&self) -> f64 {
        self.curvature
    }

    fn set_curvature(&mut self, curvature: f64) {
        self.curvature = curvature;
    }

    fn intersect(&self, p: [f64; 3], u: [f64; 3]) -> Option<f64> {
        let c = self.curvature;
        let pu = p[0] * u[0] + p[1] * u[1] + p[2] * u[2];
        let pp = p[0] * p[0] + p[1] * p[1] + p[2] * p[2];
        // c·t² − 2g·t + h = 0, near root in the cancellation-free form.
        let g = u[2] - c * pu;
        let h = c * pp - 2.0 * p[2];
        let disc = g * g - c * h;
        if disc < 0.0 {
            return None;
        }
        let denom = g + disc.sqrt();
        if denom <= 0.0 {
            return None;
        }
        Some(h / denom)
    }

    fn normal(&self, q: [f64; 3]) -> [f64; 3] {
        let c = self.curvature;
        let n = [-c * q[0], -c * q[1], 1.0 - c * q[2]];
        let norm = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        [n[0] / norm, n[1] / norm, n[2] / norm]
    }

    fn revert(&mut self) {
        self.curvature = -self.curvature;
    }

    fn clone_box(&self) -> Box<dyn Optic> {
        Box::new(*self)
    }
}
