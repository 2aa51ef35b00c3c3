//! optics — the element layer: media, surfaces, object, and ray batches.
//!
//! Purpose
//! -------
//! Provide the leaf data of a sequential optical system and the per-element
//! capabilities the propagation engine sequences: exact propagation,
//! paraxial propagation, and third-order aberration bookkeeping.
//!
//! Key behaviors
//! -------------
//! - [`Material`]: refractive index vs wavelength via the linear
//!   Abbe-number approximation.
//! - [`Optic`]: the surface-geometry seam (intersection and normal), with
//!   the reference [`Spherical`] surface.
//! - [`Element`] / [`ElementKind`]: chain nodes tagged once at construction;
//!   `is_stop` marks the aperture stop.
//! - [`Object`]: maps field heights and aiming coordinates to launch state
//!   and fills pupils with ray grids.
//! - [`Rays`]: the batch value threaded through the engine.
//!
//! Invariants & assumptions
//! ------------------------
//! - Element kinds never change after construction.
//! - Origins are offsets from the previous vertex, never absolute.
//! - Vignetting is recorded per ray; no element operation fails on a ray
//!   that misses.
//!
//! Conventions
//! -----------
//! - Local frames have `+z` along the axis towards the image.
//! - Constructors validate and return [`OpticsResult`]; tracing methods are
//!   infallible.
//!
//! Testing notes
//! -------------
//! - Unit tests cover Snell refraction, sphere intersection, vignetting
//!   flags, launch mapping for both conjugates, and pupil-grid mapping.

pub mod element;
pub mod errors;
pub mod material;
pub mod object;
pub mod optic;
pub mod rays;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::element::{ABERRATION3_TERMS, Element, ElementKind};
pub use self::errors::{OpticsError, OpticsResult};
pub use self::material::{Material, WAVELENGTH_C_LINE, WAVELENGTH_D_LINE, WAVELENGTH_F_LINE};
pub use self::object::{Marginals, Object};
pub use self::optic::{Optic, Spherical};
pub use self::rays::Rays;

pub mod prelude {
    pub use super::element::{Element, ElementKind};
    pub use super::material::Material;
    pub use super::object::{Marginals, Object};
    pub use super::optic::{Optic, Spherical};
    pub use super::rays::Rays;
}
