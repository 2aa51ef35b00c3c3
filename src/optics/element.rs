//! Elements of the sequential chain and their propagation capabilities.
//!
//! Purpose
//! -------
//! Represent one node of the chain between object and image: its offset
//! from the previous vertex, clear aperture, the medium behind it, and the
//! surface geometry. Each element knows how to carry exact rays and the two
//! paraxial rays across itself; the system only sequences these calls.
//!
//! Key behaviors
//! -------------
//! - [`ElementKind`] is fixed at construction; [`Element::is_stop`] is the
//!   single source of truth for "this is the aperture stop".
//! - [`Element::propagate`] transfers, intersects, and refracts exact rays,
//!   flagging vignetting instead of failing.
//! - [`Element::propagate_paraxial`] and [`Element::aberration3`] update a
//!   [`ParaxialTrace`] row in place.
//!
//! Conventions
//! -----------
//! - `material` is the medium *after* the element; `None` leaves the
//!   incoming medium unchanged (stops, image, phantom surfaces).
//! - Paraxial slopes are tangents; the Seidel columns are
//!   `[SI, SII, SIII, SIV, SV, CI, CII]`.
use crate::{
    optics::{
        errors::{OpticsError, OpticsResult},
        material::Material,
        optic::{Optic, Spherical},
        rays::Rays,
    },
    system::paraxial::ParaxialTrace,
};

/// Number of third-order coefficients tracked per surface.
pub const ABERRATION3_TERMS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Refracting surface.
    Surface,
    /// Aperture stop: the reference plane for pupil coordinates.
    Aperture,
    /// Image plane.
    Image,
}

#[derive(Debug, Clone)]
pub struct Element {
    kind: ElementKind,
    /// Offset of this vertex from the previous one.
    pub origin: [f64; 3],
    /// Clear-aperture radius.
    pub radius: f64,
    /// Medium after this element.
    pub material: Option<Material>,
    optic: Box<dyn Optic>,
}

impl Element {
    /// Construct a validated element.
    ///
    /// # Errors
    /// - [`OpticsError::InvalidRadius`] unless `radius > 0` (infinity allowed).
    /// - [`OpticsError::NonFiniteOrigin`] for NaN or infinite offsets.
    pub fn new(
        kind: ElementKind, origin: [f64; 3], radius: f64, material: Option<Material>,
        optic: Box<dyn Optic>,
    ) -> OpticsResult<Self> {
        if radius.is_nan() || radius <= 0.0 {
            return Err(OpticsError::InvalidRadius {
                radius,
                reason: "Clear-aperture radius must be positive.",
            });
        }
        for (axis, &value) in origin.iter().enumerate() {
            if !value.is_finite() {
                return Err(OpticsError::NonFiniteOrigin { axis, value });
            }
        }
        Ok(Self { kind, origin, radius, material, optic })
    }

    /// Spherical refracting surface followed by `material`.
    pub fn surface(
        origin: [f64; 3], radius: f64, curvature: f64, material: Material,
    ) -> OpticsResult<Self> {
        Self::new(
            ElementKind::Surface,
            origin,
            radius,
            Some(material),
            Box::new(Spherical::new(curvature)),
        )
    }

    /// Flat aperture stop.
    pub fn aperture(origin: [f64; 3], radius: f64) -> OpticsResult<Self> {
        Self::new(ElementKind::Aperture, origin, radius, None, Box::new(Spherical::flat()))
    }

    /// Flat image plane.
    pub fn image(origin: [f64; 3], radius: f64) -> OpticsResult<Self> {
        Self::new(ElementKind::Image, origin, radius, None, Box::new(Spherical::flat()))
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn is_stop(&self) -> bool {
        self.kind == ElementKind::Aperture
    }

    pub fn optic(&self) -> &dyn Optic {
        self.optic.as_ref()
    }

    pub fn curvature(&self) -> f64 {
        self.optic.curvature()
    }

    pub fn set_curvature(&mut self, curvature: f64) {
        self.optic.set_curvature(curvature);
    }

    /// Mirror the element geometry for a reversed chain.
    pub fn revert(&mut self) {
        self.optic.revert();
    }

    fn index_after(&self, incoming: f64, wavelength: f64) -> f64 {
        self.material.as_ref().map_or(incoming, |m| m.refractive_index(wavelength))
    }

    /// Carry exact rays from the previous vertex across this element.
    ///
    /// The returned batch is in this element's local frame with
    /// `end_positions` on the surface.
    pub fn propagate(&self, rays: &Rays) -> Rays {
        let mut out = rays.clone();
        let n1 = rays.refractive_index;
        let n2 = self.index_after(n1, rays.wavelength);
        let mu = n1 / n2;
        for i in 0..rays.len() {
            let p0 = Rays::row(&rays.positions, i);
            let u = Rays::row(&rays.angles, i);
            let p = [p0[0] - self.origin[0], p0[1] - self.origin[1], p0[2] - self.origin[2]];
            let Some(t) = self.optic.intersect(p, u) else {
                out.end_positions.row_mut(i).fill(f64::NAN);
                out.positions.row_mut(i).fill(f64::NAN);
                out.vignetted[i] = true;
                continue;
            };
            let q = [p[0] + t * u[0], p[1] + t * u[1], p[2] + t * u[2]];
            if q[0].hypot(q[1]) > self.radius {
                out.vignetted[i] = true;
            }
            for k in 0..3 {
                out.end_positions[[i, k]] = q[k];
                out.positions[[i, k]] = q[k];
            }
            if mu == 1.0 {
                continue;
            }
            let mut nrm = self.optic.normal(q);
            let mut cos_i = u[0] * nrm[0] + u[1] * nrm[1] + u[2] * nrm[2];
            if cos_i < 0.0 {
                nrm = [-nrm[0], -nrm[1], -nrm[2]];
                cos_i = -cos_i;
            }
            let k = 1.0 - mu * mu * (1.0 - cos_i * cos_i);
            if k < 0.0 {
                // total internal reflection
                out.vignetted[i] = true;
                continue;
            }
            let g = k.sqrt() - mu * cos_i;
            for j in 0..3 {
                out.angles[[i, j]] = mu * u[j] + g * nrm[j];
            }
        }
        out.refractive_index = n2;
        out
    }

    /// Transfer and refract the marginal and chief paraxial rays into row
    /// `index` of `trace`.
    pub fn propagate_paraxial(&self, index: usize, trace: &mut ParaxialTrace) {
        let t = self.origin[2];
        let n0 = trace.n[index - 1];
        let n = self.index_after(n0, trace.wavelength);
        let c = self.optic.curvature();
        for k in 0..2 {
            let y = trace.y[[index - 1, k]] + t * trace.u[[index - 1, k]];
            let u = (n0 * trace.u[[index - 1, k]] - y * c * (n - n0)) / n;
            trace.y[[index, k]] = y;
            trace.u[[index, k]] = u;
        }
        trace.n[index] = n;
        trace.c[index] = c;
        trace.dn[index] = self.material.as_ref().map_or(trace.dn[index - 1], |m| m.dispersion());
    }

    /// Third-order surface contributions at row `index`; call after
    /// [`Element::propagate_paraxial`] for the same row.
    pub fn aberration3(&self, index: usize, trace: &mut ParaxialTrace) {
        let (n0, n, c) = (trace.n[index - 1], trace.n[index], trace.c[index]);
        let (y, yc) = (trace.y[[index, 0]], trace.y[[index, 1]]);
        let (u0, u0c) = (trace.u[[index - 1, 0]], trace.u[[index - 1, 1]]);
        let u = trace.u[[index, 0]];

        let a = n0 * (u0 + y * c);
        let abar = n0 * (u0c + yc * c);
        let lagrange = n0 * (u0c * y - u0 * yc);
        let du_n = u / n - u0 / n0;
        let d_inv_n = 1.0 / n - 1.0 / n0;
        let d_color = trace.dn[index] / n - trace.dn[index - 1] / n0;

        let s1 = -a * a * y * du_n;
        let s2 = -a * abar * y * du_n;
        let s3 = -abar * abar * y * du_n;
        let s4 = -lagrange * lagrange * c * d_inv_n;
        let s5 = if a == 0.0 { 0.0 } else { abar / a * (s3 + s4) };
        let c1 = a * y * d_color;
        let c2 = abar * y * d_color;

        let mut row = trace.aberration3.row_mut(index);
        for (slot, v) in row.iter_mut().zip([s1, s2, s3, s4, s5, c1, c2]) {
            *slot = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn one_ray(position: [f64; 3], direction: [f64; 3]) -> Rays {
        let mut rays = Rays::new(589.3e-9, [0.0, 0.0])
            .with_launch(
                array![[position[0], position[1], position[2]]],
                array![[direction[0], direction[1], direction[2]]],
            )
            .unwrap();
        rays.refractive_index = 1.0;
        rays
    }

    #[test]
    // Purpose
    // -------
    // Refraction at a flat air/glass boundary obeys Snell's law and keeps
    // the direction normalized.
    fn flat_refraction_obeys_snell() {
        // Arrange
        let glass = Material::glass("n15", 1.5, f64::INFINITY).unwrap();
        let element = Element::surface([0.0, 0.0, 2.0], 10.0, 0.0, glass).unwrap();
        let s = 0.3_f64;
        let rays = one_ray([0.0, 0.0, 0.0], [0.0, s, (1.0 - s * s).sqrt()]);

        // Act
        let out = element.propagate(&rays);

        // Assert
        assert_abs_diff_eq!(out.angles[[0, 1]], s / 1.5, epsilon = 1e-12);
        let norm: f64 = out.angles.row(0).iter().map(|v| v * v).sum();
        assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.end_positions[[0, 2]], 0.0, epsilon = 1e-12);
        let expected_y = 2.0 * s / (1.0 - s * s).sqrt();
        assert_abs_diff_eq!(out.end_positions[[0, 1]], expected_y, epsilon = 1e-12);
        assert_eq!(out.refractive_index, 1.5);
        assert!(!out.vignetted[0]);
    }

    #[test]
    // Purpose
    // -------
    // Vignetting is recorded as data: rays outside the clear aperture keep
    // their coordinates, rays missing the surface become NaN.
    fn vignetting_is_flagged_not_raised() {
        // Arrange
        let stop = Element::aperture([0.0, 0.0, 1.0], 1.0).unwrap();
        let ball = Element::surface([0.0, 0.0, 1.0], 10.0, 1.0, Material::air()).unwrap();
        let outside = one_ray([2.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        let miss = one_ray([3.0, 0.0, 0.0], [0.0, 0.0, 1.0]);

        // Act
        let clipped = stop.propagate(&outside);
        let missed = ball.propagate(&miss);

        // Assert
        assert!(clipped.vignetted[0]);
        assert_eq!(clipped.end_positions[[0, 0]], 2.0);
        assert!(missed.vignetted[0]);
        assert!(missed.end_positions[[0, 0]].is_nan());
    }

    #[test]
    // Purpose
    // -------
    // Kinds are fixed at construction and only apertures are stops.
    fn only_apertures_are_stops() {
        let stop = Element::aperture([0.0; 3], 1.0).unwrap();
        let image = Element::image([0.0; 3], 1.0).unwrap();
        let surface = Element::surface([0.0; 3], 1.0, 0.1, Material::air()).unwrap();
        assert!(stop.is_stop());
        assert!(!image.is_stop());
        assert!(!surface.is_stop());
        assert_eq!(image.kind(), ElementKind::Image);
    }

    #[test]
    fn invalid_radius_and_origin_are_rejected() {
        assert!(matches!(
            Element::aperture([0.0; 3], 0.0),
            Err(OpticsError::InvalidRadius { .. })
        ));
        assert!(matches!(
            Element::image([0.0, f64::NAN, 0.0], 1.0),
            Err(OpticsError::NonFiniteOrigin { axis: 1, .. })
        ));
    }
}
