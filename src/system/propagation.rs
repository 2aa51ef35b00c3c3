//! Sequential propagation engine.
//!
//! Purpose
//! -------
//! Sequence the per-node capabilities of the object and the elements:
//! exact ray batches walk object → elements → image lazily through
//! [`Propagation`], the two paraxial rays are carried eagerly through a
//! [`ParaxialTrace`].
//!
//! Key behaviors
//! -------------
//! - [`System::propagate`] returns a finite iterator of `(Node, Rays)`; it
//!   holds no state outside itself, so calling it again with the same
//!   input replays the same sequence.
//! - [`System::height_at_aperture`] is the pupil map used by ray aiming:
//!   stop-plane coordinates normalized by the stop radius.
//! - Paraxial passes write node rows `1..` of the trace; row 0 (the object)
//!   is left to the caller.
//!
//! Invariants & assumptions
//! ------------------------
//! - [`Node::is_stop`] is the only stop test in the crate.
//! - Vignetted rays travel on as data; no pass fails on them.
use ndarray::{s, Array2};

use crate::{
    optics::{element::Element, object::Object, rays::Rays},
    system::{
        errors::{TraceError, TraceResult},
        paraxial::ParaxialTrace,
        system::System,
    },
};

/// A node visited by a propagating batch.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Object(&'a Object),
    Element(&'a Element),
}

impl Node<'_> {
    pub fn is_stop(&self) -> bool {
        match self {
            Node::Object(_) => false,
            Node::Element(e) => e.is_stop(),
        }
    }

    /// Clear-aperture radius; the object's half-height for the object.
    pub fn radius(&self) -> f64 {
        match self {
            Node::Object(o) => o.radius,
            Node::Element(e) => e.radius,
        }
    }

    fn propagate(&self, rays: &Rays) -> Rays {
        match self {
            Node::Object(o) => o.propagate(rays),
            Node::Element(e) => e.propagate(rays),
        }
    }
}

/// Lazy walk of one batch through object, elements, and image.
#[derive(Debug)]
pub struct Propagation<'a> {
    system: &'a System,
    rays: Rays,
    next: usize,
}

impl<'a> Propagation<'a> {
    fn node(&self, index: usize) -> Option<Node<'a>> {
        let elements = self.system.elements();
        match index {
            0 => Some(Node::Object(&self.system.object)),
            i if i <= elements.len() => Some(Node::Element(&elements[i - 1])),
            i if i == elements.len() + 1 => Some(Node::Element(&self.system.image)),
            _ => None,
        }
    }
}

impl<'a> Iterator for Propagation<'a> {
    type Item = (Node<'a>, Rays);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.node(self.next)?;
        self.next += 1;
        self.rays = node.propagate(&self.rays);
        Some((node, self.rays.clone()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.system.elements().len() + 2).saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Propagation<'_> {}

impl System {
    /// Walk `rays` through the chain, yielding the batch after every node.
    pub fn propagate(&self, rays: &Rays) -> Propagation<'_> {
        Propagation { system: self, rays: rays.clone(), next: 0 }
    }

    /// The batch at the image plane.
    pub fn propagate_through(&self, rays: &Rays) -> Rays {
        self.propagate(rays).last().map_or_else(|| rays.clone(), |(_, r)| r)
    }

    /// Stop-plane `(x, y)` of every ray, divided by the stop radius.
    ///
    /// # Errors
    /// [`TraceError::NoAperture`] if no node is a stop.
    pub fn height_at_aperture(&self, rays: &Rays) -> TraceResult<Array2<f64>> {
        let (node, at_stop) =
            self.propagate(rays).find(|(node, _)| node.is_stop()).ok_or(TraceError::NoAperture)?;
        Ok(at_stop.end_positions.slice(s![.., 0..2]).mapv(|v| v / node.radius()))
    }

    /// Carry the marginal and chief rays from row 0 of `trace` to the image,
    /// accumulating third-order contributions.
    pub fn propagate_paraxial(&self, trace: &mut ParaxialTrace) {
        for (i, element) in self.elements().iter().enumerate() {
            element.propagate_paraxial(i + 1, trace);
            element.aberration3(i + 1, trace);
        }
        let last = self.elements().len() + 1;
        self.image.propagate_paraxial(last, trace);
        self.image.aberration3(last, trace);
    }

    /// Carry the paraxial rays to the first stop and return their
    /// `(marginal, chief)` heights there.
    ///
    /// # Errors
    /// [`TraceError::NoAperture`] if no element is a stop.
    pub fn height_at_aperture_paraxial(&self, trace: &mut ParaxialTrace) -> TraceResult<[f64; 2]> {
        for (i, element) in self.elements().iter().enumerate() {
            element.propagate_paraxial(i + 1, trace);
            if Node::Element(element).is_stop() {
                return Ok([trace.y[[i + 1, 0]], trace.y[[i + 1, 1]]]);
            }
        }
        Err(TraceError::NoAperture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::fixtures::{front_stop_singlet, rear_stop_singlet};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;

    fn axial_pair(system: &System, y: f64) -> Rays {
        let launch = array![[0.0, y], [0.0, -y]];
        let (p, a) = system.object.rays_to_height(launch.view(), [0.0, 0.0]).unwrap();
        Rays::new(system.primary_wavelength(), [0.0, 0.0]).with_launch(p, a).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // The iterator visits object, every element, and the image, in order,
    // and replays identically.
    fn propagation_visits_every_node_once() {
        // Arrange
        let system = front_stop_singlet();
        let rays = axial_pair(&system, 0.5);

        // Act
        let first: Vec<(Node, Rays)> = system.propagate(&rays).collect();
        let second: Vec<Rays> = system.propagate(&rays).map(|(_, r)| r).collect();

        // Assert
        assert_eq!(first.len(), system.elements().len() + 2);
        assert!(matches!(first[0].0, Node::Object(_)));
        assert!(first[1].0.is_stop());
        assert_eq!(first.iter().filter(|(n, _)| n.is_stop()).count(), 1);
        for ((_, a), b) in first.iter().zip(&second) {
            assert_eq!(a, b);
        }
        assert_eq!(system.propagate(&rays).len(), 5);
    }

    #[test]
    // Purpose
    // -------
    // Near-axis exact rays land where the paraxial trace predicts.
    //
    // Given
    // -----
    // - A ray pair at ±1 % of the stop radius through the front-stop
    //   singlet.
    //
    // Expect
    // ------
    // - Heights and slope tangents after the rear surface agree with the
    //   paraxial marginal ray scaled by 0.01, within 1e-2 relative.
    fn exact_and_paraxial_agree_near_axis() {
        // Arrange
        let system = front_stop_singlet();
        let trace = ParaxialTrace::new(&system).unwrap();
        let rays = axial_pair(&system, 0.01);

        // Act
        let (_, rear) = system.propagate(&rays).nth(3).unwrap();
        let image = system.propagate_through(&rays);

        // Assert
        let y = trace.y[[3, 0]] * 0.01;
        let u = trace.u[[3, 0]] * 0.01;
        assert_relative_eq!(rear.end_positions[[0, 1]], y, max_relative = 1e-2);
        assert_relative_eq!(rear.end_positions[[1, 1]], -y, max_relative = 1e-2);
        assert_relative_eq!(rear.angles[[0, 1]] / rear.angles[[0, 2]], u, max_relative = 1e-2);
        assert_eq!(image.valid_count(), 2);
    }

    #[test]
    // Purpose
    // -------
    // The pupil map normalizes by the stop radius and is linear near the
    // axis for a stop behind the lens.
    fn height_at_aperture_normalizes_by_stop_radius() {
        // Front stop: nothing precedes it, so the map is the identity / r.
        let front = front_stop_singlet();
        let h = front.height_at_aperture(&axial_pair(&front, 0.5)).unwrap();
        assert_abs_diff_eq!(h[[0, 1]], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(h[[1, 1]], -0.5, epsilon = 1e-12);

        // Rear stop: matches the paraxial trial-ray height scaled by 1/r.
        let rear = rear_stop_singlet();
        let trace = ParaxialTrace::new(&rear).unwrap();
        let y0 = 1e-3;
        let h = rear.height_at_aperture(&axial_pair(&rear, y0)).unwrap();
        let [marginal, _] = trace.stop_heights();
        let expected = y0 / trace.y[[0, 0]] * marginal / 0.5;
        assert_abs_diff_eq!(h[[0, 1]], expected, epsilon = 1e-6);
    }

    #[test]
    fn height_at_aperture_without_stop_fails() {
        let template = front_stop_singlet();
        let system = System::new(
            "no stop",
            template.object.clone(),
            template.elements()[1..].to_vec(),
            template.image.clone(),
        );
        let rays = axial_pair(&system, 0.5);

        assert_eq!(system.height_at_aperture(&rays).unwrap_err(), TraceError::NoAperture);
        let mut trace = ParaxialTrace::new(&template).unwrap();
        assert_eq!(
            system.height_at_aperture_paraxial(&mut trace).unwrap_err(),
            TraceError::NoAperture
        );
    }
}
