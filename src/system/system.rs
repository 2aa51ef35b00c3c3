//! System assembly: the object, the ordered element chain, and the image.
//!
//! Purpose
//! -------
//! Own the chain that the propagation engine walks, resolve the aperture
//! stop once whenever the chain's structure changes, and provide the
//! structural edits a lens designer needs (reversal and concatenation).
//!
//! Key behaviors
//! -------------
//! - [`System::new`] assembles a chain and records the stop positions.
//! - [`System::stop_index`] enforces the single-stop precondition.
//! - [`System::revert`] reverses the chain in place; applying it twice
//!   restores the original order, offsets, curvatures, and materials.
//! - `a + b` appends `b`'s elements to `a` (object and image of `a` kept).
//!
//! Invariants & assumptions
//! ------------------------
//! - `stops` always lists the indices of the aperture elements in
//!   `elements`; element kinds are immutable and the element vector is only
//!   exposed as a slice, so only the methods here can change its structure.
//! - `wavelengths` is non-empty, finite, and positive.
use ndarray::Array1;

use crate::{
    optics::{element::Element, material::WAVELENGTH_D_LINE, object::Object},
    system::errors::{TraceError, TraceResult},
};

#[derive(Debug, Clone)]
pub struct System {
    pub name: String,
    /// Wavelengths in metres; the first is the primary wavelength.
    wavelengths: Vec<f64>,
    /// Relative field heights `(x, y)` of interest.
    pub heights: Vec<[f64; 2]>,
    /// Metres per system length unit.
    pub scale: f64,
    /// Ambient temperature in °C.
    pub temperature: f64,
    pub object: Object,
    elements: Vec<Element>,
    pub image: Element,
    stops: Vec<usize>,
}

impl System {
    pub fn new(
        name: impl Into<String>, object: Object, elements: Vec<Element>, image: Element,
    ) -> Self {
        let mut system = Self {
            name: name.into(),
            wavelengths: vec![WAVELENGTH_D_LINE],
            heights: vec![[0.0, 0.0]],
            scale: 1e-3,
            temperature: 21.0,
            object,
            elements,
            image,
            stops: Vec::new(),
        };
        system.resolve_stops();
        system
    }

    /// Replace the wavelength list.
    ///
    /// # Errors
    /// - [`TraceError::EmptyWavelengths`] for an empty list.
    /// - [`TraceError::InvalidWavelength`] for non-finite or non-positive
    ///   entries.
    pub fn with_wavelengths(mut self, wavelengths: Vec<f64>) -> TraceResult<Self> {
        if wavelengths.is_empty() {
            return Err(TraceError::EmptyWavelengths);
        }
        for (index, &value) in wavelengths.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 {
                return Err(TraceError::InvalidWavelength { index, value });
            }
        }
        self.wavelengths = wavelengths;
        Ok(self)
    }

    pub fn with_heights(mut self, heights: Vec<[f64; 2]>) -> Self {
        self.heights = heights;
        self
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn primary_wavelength(&self) -> f64 {
        self.wavelengths[0]
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Mutable access to element attributes; the chain structure is fixed.
    pub fn elements_mut(&mut self) -> &mut [Element] {
        &mut self.elements
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
        self.resolve_stops();
    }

    /// Indices of all aperture stops in `elements`.
    pub fn stops(&self) -> &[usize] {
        &self.stops
    }

    /// Index in `elements` of the unique aperture stop.
    ///
    /// # Errors
    /// [`TraceError::ApertureCount`] unless exactly one stop exists.
    pub fn stop_index(&self) -> TraceResult<usize> {
        match self.stops.as_slice() {
            [only] => Ok(*only),
            other => Err(TraceError::ApertureCount { found: other.len() }),
        }
    }

    /// The first aperture stop in chain order, with its index in `elements`.
    pub fn first_stop(&self) -> Option<(usize, &Element)> {
        self.stops.first().map(|&i| (i, &self.elements[i]))
    }

    /// Absolute vertex positions along z for object, elements, and image.
    pub fn vertex_z(&self) -> Array1<f64> {
        let mut z = Array1::zeros(self.elements.len() + 2);
        let mut acc = 0.0;
        for (i, e) in self.elements.iter().chain(std::iter::once(&self.image)).enumerate() {
            acc += e.origin[2];
            z[i + 1] = acc;
        }
        z
    }

    /// Reverse the chain in place.
    pub fn revert(&mut self) {
        if self.elements.is_empty() {
            return;
        }
        if let Some(last) = self.elements.iter().rev().find_map(|e| e.material.clone()) {
            let mut carried = std::mem::replace(&mut self.object.material, last);
            for e in self.elements.iter_mut() {
                if let Some(m) = e.material.as_mut() {
                    std::mem::swap(m, &mut carried);
                }
            }
        }
        let mut offset = std::mem::replace(&mut self.image.origin, self.elements[0].origin);
        self.elements.reverse();
        for e in self.elements.iter_mut() {
            e.revert();
            std::mem::swap(&mut e.origin, &mut offset);
        }
        self.resolve_stops();
    }

    fn resolve_stops(&mut self) {
        self.stops =
            self.elements.iter().enumerate().filter(|(_, e)| e.is_stop()).map(|(i, _)| i).collect();
    }
}

impl std::ops::AddAssign for System {
    fn add_assign(&mut self, other: System) {
        self.elements.extend(other.elements);
        self.resolve_stops();
    }
}

impl std::ops::Add for System {
    type Output = System;

    fn add(mut self, other: System) -> System {
        self += other;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optics::material::Material;
    use crate::system::fixtures::{front_stop_singlet, rear_stop_singlet};

    #[test]
    // Purpose
    // -------
    // Reversal is an involution over order, offsets, curvatures, and
    // materials, including the object medium.
    //
    // Given
    // -----
    // - A singlet with a stop behind it, so the chain mixes materialized
    //   surfaces and a material-less stop.
    //
    // Expect
    // ------
    // - One reversal moves the stop to the front and the image offset onto
    //   the first element.
    // - Two reversals reproduce the original system.
    fn revert_twice_restores_system() {
        // Arrange
        let original = rear_stop_singlet();
        let mut system = original.clone();

        // Act
        system.revert();
        let once = system.clone();
        system.revert();

        // Assert
        assert!(once.elements()[0].is_stop());
        assert_eq!(once.elements()[0].origin, original.image.origin);
        assert_eq!(once.image.origin, original.elements()[0].origin);
        assert_eq!(once.object.material, original.elements()[1].material.clone().unwrap());
        assert_eq!(once.stops(), &[0]);

        assert_eq!(system.elements().len(), original.elements().len());
        for (a, b) in system.elements().iter().zip(original.elements()) {
            assert_eq!(a.kind(), b.kind());
            assert_eq!(a.origin, b.origin);
            assert_eq!(a.radius, b.radius);
            assert_eq!(a.material, b.material);
            assert_eq!(a.curvature(), b.curvature());
        }
        assert_eq!(system.image.origin, original.image.origin);
        assert_eq!(system.object.material, original.object.material);
        assert_eq!(system.stops(), original.stops());
    }

    #[test]
    // Purpose
    // -------
    // Reversal moves each material to the element that bounds it from the
    // other side.
    fn revert_shifts_materials_towards_the_back() {
        let mut system = front_stop_singlet();
        system.revert();

        // [s2, s1, stop]: s2 now enters glass, s1 leaves it into object air.
        let glass = front_stop_singlet().elements()[1].material.clone();
        assert_eq!(system.elements()[0].material, glass);
        assert_eq!(system.elements()[1].material, Some(Material::air()));
        assert!(system.elements()[2].material.is_none());
        assert_eq!(system.elements()[0].curvature(), 0.05);
    }

    #[test]
    // Purpose
    // -------
    // Concatenation is associative in the resulting element order.
    fn concatenation_is_associative() {
        // Arrange
        let a = front_stop_singlet();
        let b = rear_stop_singlet();
        let c = front_stop_singlet();

        // Act
        let left = (a.clone() + b.clone()) + c.clone();
        let right = a + (b + c);

        // Assert
        assert_eq!(left.elements().len(), right.elements().len());
        for (l, r) in left.elements().iter().zip(right.elements()) {
            assert_eq!(l.kind(), r.kind());
            assert_eq!(l.origin, r.origin);
            assert_eq!(l.curvature(), r.curvature());
        }
        assert_eq!(left.stops(), right.stops());
        assert_eq!(left.stops().len(), 3);
    }

    #[test]
    // Purpose
    // -------
    // The single-stop precondition reports how many stops were found.
    fn stop_index_requires_exactly_one_stop() {
        let single = front_stop_singlet();
        assert_eq!(single.stop_index(), Ok(0));

        let double = front_stop_singlet() + front_stop_singlet();
        assert_eq!(double.stop_index(), Err(TraceError::ApertureCount { found: 2 }));

        let mut none = front_stop_singlet();
        none.revert();
        let bare = System::new(
            "bare",
            none.object.clone(),
            none.elements()[..2].to_vec(),
            none.image.clone(),
        );
        assert_eq!(bare.stop_index(), Err(TraceError::ApertureCount { found: 0 }));
    }

    #[test]
    fn wavelengths_are_validated() {
        let system = front_stop_singlet();
        assert_eq!(
            system.clone().with_wavelengths(vec![]).unwrap_err(),
            TraceError::EmptyWavelengths
        );
        assert_eq!(
            system.clone().with_wavelengths(vec![500e-9, -1.0]).unwrap_err(),
            TraceError::InvalidWavelength { index: 1, value: -1.0 }
        );
        let ok = system.with_wavelengths(vec![486.1e-9, 589.3e-9]).unwrap();
        assert_eq!(ok.primary_wavelength(), 486.1e-9);
    }

    #[test]
    fn vertex_z_accumulates_offsets() {
        let system = front_stop_singlet();
        let z = system.vertex_z();
        assert_eq!(z.len(), 5);
        assert_eq!(z[1], 5.0);
        assert_eq!(z[2], 10.0);
        assert_eq!(z[3], 12.0);
    }
}
