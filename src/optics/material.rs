//! Optical media bounding the elements of a system.
//!
//! A [`Material`] is the medium *after* an element (or the object-space
//! medium for the object). Dispersion is modelled with the linear
//! Abbe-number approximation about the sodium d line; anything richer is the
//! business of a glass catalogue, not of the tracing core.
use crate::optics::errors::{OpticsError, OpticsResult};

/// The wavelength of the sodium D line (yellow).
pub const WAVELENGTH_D_LINE: f64 = 589.3e-9;

/// The wavelength of the hydrogen F line (blue).
pub const WAVELENGTH_F_LINE: f64 = 486.1e-9;

/// The wavelength of the hydrogen C line (red).
pub const WAVELENGTH_C_LINE: f64 = 656.3e-9;

/// A homogeneous optical medium.
///
/// Fields
/// ------
/// - `name`: catalogue name, informational only.
/// - `nd`: refractive index at the d line.
/// - `vd`: Abbe number; `f64::INFINITY` marks a non-dispersive medium.
/// - `solid`: `true` for glasses (lens bodies), `false` for gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub nd: f64,
    pub vd: f64,
    pub solid: bool,
}

impl Material {
    /// Construct a validated material.
    ///
    /// # Errors
    /// - [`OpticsError::InvalidIndex`] if `nd` is non-finite or below 1.
    /// - [`OpticsError::InvalidAbbe`] if `vd` is NaN or not positive.
    pub fn new(name: impl Into<String>, nd: f64, vd: f64, solid: bool) -> OpticsResult<Self> {
        if !nd.is_finite() || nd < 1.0 {
            return Err(OpticsError::InvalidIndex { nd });
        }
        if vd.is_nan() || vd <= 0.0 {
            return Err(OpticsError::InvalidAbbe { vd });
        }
        Ok(Self { name: name.into(), nd, vd, solid })
    }

    /// Non-dispersive air with unit index.
    pub fn air() -> Self {
        Self { name: "air".to_string(), nd: 1.0, vd: f64::INFINITY, solid: false }
    }

    /// A solid glass.
    pub fn glass(name: impl Into<String>, nd: f64, vd: f64) -> OpticsResult<Self> {
        Self::new(name, nd, vd, true)
    }

    /// Principal dispersion `n_F − n_C = (nd − 1) / vd`.
    pub fn dispersion(&self) -> f64 {
        if self.vd.is_infinite() { 0.0 } else { (self.nd - 1.0) / self.vd }
    }

    /// The index of refraction at the given wavelength.
    pub fn refractive_index(&self, wavelength: f64) -> f64 {
        let k = self.dispersion() / (WAVELENGTH_F_LINE - WAVELENGTH_C_LINE);
        self.nd + k * (wavelength - WAVELENGTH_D_LINE)
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // The d-line index is returned unchanged and blue light sees a higher
    // index than red for a normally dispersive glass.
    fn refractive_index_matches_nd_and_is_normally_dispersive() {
        // Arrange
        let bk7 = Material::glass("N-BK7", 1.5168, 64.17).unwrap();

        // Act
        let n_d = bk7.refractive_index(WAVELENGTH_D_LINE);
        let n_f = bk7.refractive_index(WAVELENGTH_F_LINE);
        let n_c = bk7.refractive_index(WAVELENGTH_C_LINE);

        // Assert
        assert_relative_eq!(n_d, 1.5168, epsilon = 1e-12);
        assert!(n_f > n_c);
        assert_relative_eq!(n_f - n_c, bk7.dispersion(), epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Air is non-dispersive and invalid indices are rejected.
    fn air_is_flat_and_invalid_index_is_rejected() {
        let air = Material::air();
        assert_eq!(air.dispersion(), 0.0);
        assert_eq!(air.refractive_index(WAVELENGTH_F_LINE), 1.0);
        assert!(!air.solid);

        let err = Material::glass("bogus", 0.5, 50.0).unwrap_err();
        assert_eq!(err, OpticsError::InvalidIndex { nd: 0.5 });
        assert!(matches!(Material::glass("bogus", 1.5, 0.0), Err(OpticsError::InvalidAbbe { .. })));
    }
}
