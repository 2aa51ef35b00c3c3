//! Concrete demerits: focal-length target, RMS spot radius, and
//! closure-backed residuals.
use ndarray::{Array1, Axis, array};

use crate::{
    optics::rays::Rays,
    optimization::{
        errors::{OptError, OptResult},
        merit::traits::Demerit,
    },
    system::{paraxial::ParaxialTrace, system::System},
};

/// Paraxial effective focal length minus a target value.
#[derive(Debug, Clone, PartialEq)]
pub struct FocalLength {
    pub target: f64,
    pub weight: f64,
}

impl FocalLength {
    pub fn new(target: f64) -> Self {
        Self { target, weight: 1.0 }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl Demerit for FocalLength {
    fn name(&self) -> &str {
        "focal length"
    }

    fn evaluate(
        &self, _system: &System, paraxial: &ParaxialTrace, _rays: &[Rays],
    ) -> OptResult<Array1<f64>> {
        Ok(array![paraxial.focal_length() - self.target])
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

/// RMS radius of each bundle's image-plane footprint about its own
/// centroid; one residual per bundle.
///
/// # Errors
/// [`OptError::EmptyBundle`] if every ray of a bundle was vignetted.
#[derive(Debug, Clone, PartialEq)]
pub struct RmsSpot {
    pub weight: f64,
}

impl RmsSpot {
    pub fn new() -> Self {
        Self { weight: 1.0 }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl Default for RmsSpot {
    fn default() -> Self {
        Self::new()
    }
}

impl Demerit for RmsSpot {
    fn name(&self) -> &str {
        "rms spot"
    }

    fn evaluate(
        &self, _system: &System, _paraxial: &ParaxialTrace, rays: &[Rays],
    ) -> OptResult<Array1<f64>> {
        let mut out = Array1::zeros(rays.len());
        for (index, bundle) in rays.iter().enumerate() {
            let xy = bundle.valid_end_xy();
            let centroid = xy.mean_axis(Axis(0)).ok_or(OptError::EmptyBundle { index })?;
            let spread = &xy - &centroid;
            let mean_sq = spread.mapv(|v| v * v).sum() / xy.nrows() as f64;
            out[index] = mean_sq.sqrt();
        }
        Ok(out)
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

type Residuals = Box<dyn Fn(&System, &ParaxialTrace, &[Rays]) -> Array1<f64>>;

/// Demerit backed by a closure over the traced trial system.
pub struct FnDemerit {
    name: String,
    weight: f64,
    f: Residuals,
}

impl FnDemerit {
    pub fn new(
        name: impl Into<String>,
        f: impl Fn(&System, &ParaxialTrace, &[Rays]) -> Array1<f64> + 'static,
    ) -> Self {
        Self { name: name.into(), weight: 1.0, f: Box::new(f) }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl std::fmt::Debug for FnDemerit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnDemerit")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

impl Demerit for FnDemerit {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(
        &self, system: &System, paraxial: &ParaxialTrace, rays: &[Rays],
    ) -> OptResult<Array1<f64>> {
        Ok((self.f)(system, paraxial, rays))
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::fixtures::front_stop_singlet;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    // ---------------------------------------------------------------------
    // Scope
    // -----
    // - Residual values of the concrete demerits on hand-built batches.
    // - Empty-bundle reporting.
    // ---------------------------------------------------------------------

    fn batch(points: &[[f64; 2]], vignetted: &[bool]) -> Rays {
        let n = points.len();
        let positions =
            Array2::from_shape_fn((n, 3), |(i, j)| if j < 2 { points[i][j] } else { 0.0 });
        let angles = Array2::from_shape_fn((n, 3), |(_, j)| if j == 2 { 1.0 } else { 0.0 });
        let mut rays = Rays::new(0.5876e-6, [0.0, 0.0]).with_launch(positions, angles).unwrap();
        rays.vignetted = Array1::from(vignetted.to_vec());
        rays
    }

    #[test]
    fn focal_length_residual_is_efl_minus_target() {
        let system = front_stop_singlet();
        let trace = ParaxialTrace::new(&system).unwrap();
        let demerit = FocalLength::new(20.0).with_weight(3.0);

        let r = demerit.evaluate(&system, &trace, &[]).unwrap();

        assert_eq!(r.len(), 1);
        assert_relative_eq!(r[0], trace.focal_length() - 20.0);
        assert_eq!(demerit.weight(), 3.0);
    }

    #[test]
    // Purpose
    // -------
    // The spot radius is measured about the centroid of the unvignetted
    // rays only.
    //
    // Given
    // -----
    // - Four valid rays on a square of half-side 1 centred at (5, 5), plus
    //   one vignetted outlier.
    //
    // Expect
    // ------
    // - RMS radius √2; a fully vignetted second bundle is EmptyBundle { 1 }.
    fn rms_spot_uses_valid_rays_about_centroid() {
        // Arrange
        let system = front_stop_singlet();
        let trace = ParaxialTrace::new(&system).unwrap();
        let square = batch(
            &[[4.0, 4.0], [6.0, 4.0], [4.0, 6.0], [6.0, 6.0], [100.0, 0.0]],
            &[false, false, false, false, true],
        );
        let lost = batch(&[[0.0, 0.0]], &[true]);

        // Act
        let r = RmsSpot::new().evaluate(&system, &trace, &[square.clone()]).unwrap();
        let err = RmsSpot::new().evaluate(&system, &trace, &[square, lost]).unwrap_err();

        // Assert
        assert_relative_eq!(r[0], 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(err, OptError::EmptyBundle { index: 1 });
    }

    #[test]
    fn fn_demerit_calls_its_closure() {
        let system = front_stop_singlet();
        let trace = ParaxialTrace::new(&system).unwrap();
        let demerit =
            FnDemerit::new("image distance", |s: &System, _: &ParaxialTrace, _: &[Rays]| {
                array![s.image.origin[2] - 20.0, 0.0]
            });

        let r = demerit.evaluate(&system, &trace, &[]).unwrap();

        assert_eq!(r, array![-1.0, 0.0]);
        assert_eq!(demerit.name(), "image distance");
    }
}
