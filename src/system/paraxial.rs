//! Paraxial (first-order) trace of the marginal and chief rays.
//!
//! Purpose
//! -------
//! Build a read-only snapshot of the two paraxial rays through a system and
//! expose the first-order quantities derived from it: focal length, image
//! height, Lagrange invariant, numerical aperture, and the third-order
//! (Seidel) aberration sums.
//!
//! Key behaviors
//! -------------
//! - [`ParaxialTrace::new`] traces two trial rays to the stop, scales them
//!   so the marginal ray fills the stop and the chief ray crosses its centre,
//!   then traces the scaled pair to the image.
//! - An auxiliary parallel ray gives the effective focal length.
//!
//! Invariants & assumptions
//! ------------------------
//! - Rows are nodes: row 0 is the object, row `i + 1` is element `i`, the
//!   last row is the image.
//! - Column 0 of `y`/`u` is the marginal ray, column 1 the chief ray.
//! - Slopes are reduced to tangents; angles are not.
//!
//! Conventions
//! -----------
//! - Infinite object: the marginal ray starts parallel to the axis and the
//!   chief ray has slope `tan(field_angle)`.
//! - Finite object: the marginal ray starts on axis and the chief ray at the
//!   object height `radius`.
use ndarray::{Array1, Array2};

use crate::{
    optics::element::ABERRATION3_TERMS,
    system::{
        errors::{TraceError, TraceResult},
        system::System,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct ParaxialTrace {
    pub wavelength: f64,
    /// Ray heights, `nodes × 2` (marginal, chief).
    pub y: Array2<f64>,
    /// Ray slopes, `nodes × 2` (marginal, chief).
    pub u: Array2<f64>,
    /// Refractive index after each node.
    pub n: Array1<f64>,
    /// Surface curvature at each node.
    pub c: Array1<f64>,
    /// Principal dispersion of the medium after each node.
    pub dn: Array1<f64>,
    /// Third-order surface contributions, `nodes × 7`.
    pub aberration3: Array2<f64>,
    pub efl: f64,
    /// Index in `System::elements` of the stop the rays were scaled to.
    pub stop: usize,
}

impl ParaxialTrace {
    /// Trace the marginal and chief rays of `system` at its primary
    /// wavelength.
    ///
    /// # Errors
    /// - [`TraceError::NoAperture`] if the chain has no stop.
    /// - [`TraceError::DegenerateParaxial`] if a trial ray reaches the stop
    ///   on axis, which leaves the scaling undefined.
    pub fn new(system: &System) -> TraceResult<Self> {
        let (stop, stop_element) = system.first_stop().ok_or(TraceError::NoAperture)?;
        let r = stop_element.radius;

        let mut trace = Self::allocate(system);
        trace.launch([1.0, 0.0], [0.0, 1.0]);
        let [s_a, s_b] = system.height_at_aperture_paraxial(&mut trace)?;

        let object = &system.object;
        let (marginal, chief) = if object.is_infinite() {
            if s_a == 0.0 {
                return Err(TraceError::DegenerateParaxial {
                    reason: "Axis-parallel ray crosses the stop on axis.",
                });
            }
            let u_field = object.field_angle.tan();
            ([r / s_a, 0.0], [-u_field * s_b / s_a, u_field])
        } else {
            if s_b == 0.0 {
                return Err(TraceError::DegenerateParaxial {
                    reason: "Ray from the axial object point crosses the stop on axis.",
                });
            }
            ([0.0, r / s_b], [object.radius, -object.radius * s_a / s_b])
        };

        let mut aux = Self::allocate(system);
        aux.launch([1.0, 0.0], [0.0, 0.0]);
        system.propagate_paraxial(&mut aux);
        let u_last = aux.u[[aux.u.nrows() - 1, 0]];

        let mut trace = Self::allocate(system);
        trace.launch(marginal, chief);
        system.propagate_paraxial(&mut trace);
        trace.efl = if u_last == 0.0 { f64::INFINITY } else { -1.0 / u_last };
        trace.stop = stop;
        Ok(trace)
    }

    fn allocate(system: &System) -> Self {
        let nodes = system.elements().len() + 2;
        let wavelength = system.primary_wavelength();
        let mut n = Array1::ones(nodes);
        let mut dn = Array1::zeros(nodes);
        n[0] = system.object.material.refractive_index(wavelength);
        dn[0] = system.object.material.dispersion();
        Self {
            wavelength,
            y: Array2::zeros((nodes, 2)),
            u: Array2::zeros((nodes, 2)),
            n,
            c: Array1::zeros(nodes),
            dn,
            aberration3: Array2::zeros((nodes, ABERRATION3_TERMS)),
            efl: f64::NAN,
            stop: 0,
        }
    }

    /// Set the object-row `(y, u)` of the marginal and chief rays.
    fn launch(&mut self, marginal: [f64; 2], chief: [f64; 2]) {
        self.y[[0, 0]] = marginal[0];
        self.u[[0, 0]] = marginal[1];
        self.y[[0, 1]] = chief[0];
        self.u[[0, 1]] = chief[1];
    }

    fn last(&self) -> usize {
        self.y.nrows() - 1
    }

    /// `H = n (ū y − u ȳ)` evaluated at `node`.
    pub fn lagrange_invariant_at(&self, node: usize) -> f64 {
        let (y, u) = (self.y.row(node), self.u.row(node));
        self.n[node] * (u[1] * y[0] - u[0] * y[1])
    }

    /// Lagrange invariant in object space.
    pub fn lagrange_invariant(&self) -> f64 {
        self.lagrange_invariant_at(0)
    }

    /// Effective focal length; infinite for an afocal system.
    pub fn focal_length(&self) -> f64 {
        self.efl
    }

    /// Column sums `[SI, SII, SIII, SIV, SV, CI, CII]` over all nodes.
    pub fn seidel(&self) -> Array1<f64> {
        self.aberration3.sum_axis(ndarray::Axis(0))
    }

    /// Chief-ray height at the image plane.
    pub fn image_height(&self) -> f64 {
        self.y[[self.last(), 1]]
    }

    /// Distance from the image plane to the paraxial marginal focus.
    pub fn paraxial_focus(&self) -> f64 {
        let last = self.last();
        let u = self.u[[last, 0]];
        if u == 0.0 { f64::INFINITY } else { -self.y[[last, 0]] / u }
    }

    /// Image-space numerical aperture `n sin(atan u)` of the marginal ray.
    pub fn numerical_aperture(&self) -> f64 {
        let last = self.last();
        self.n[last] * self.u[[last, 0]].atan().sin().abs()
    }

    /// Marginal and chief heights at the stop.
    pub fn stop_heights(&self) -> [f64; 2] {
        let row = self.stop + 1;
        [self.y[[row, 0]], self.y[[row, 1]]]
    }
}
