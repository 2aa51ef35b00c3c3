//! Test systems shared by the unit tests.
use crate::{
    optics::{element::Element, material::Material, object::Object},
    system::system::System,
};

pub(crate) fn bk7() -> Material {
    Material::glass("N-BK7", 1.5168, 64.17).unwrap()
}

/// Biconvex singlet (c = ±0.05, t = 2) with a unit stop 5 in front of it,
/// object at infinity, 0.05 rad half field. Image plane 19 behind the lens,
/// just short of the paraxial focus.
pub(crate) fn front_stop_singlet() -> System {
    System::new(
        "front stop singlet",
        Object::infinite(0.05).unwrap(),
        vec![
            Element::aperture([0.0, 0.0, 5.0], 1.0).unwrap(),
            Element::surface([0.0, 0.0, 5.0], 3.0, 0.05, bk7()).unwrap(),
            Element::surface([0.0, 0.0, 2.0], 3.0, -0.05, Material::air()).unwrap(),
        ],
        Element::image([0.0, 0.0, 19.0], 5.0).unwrap(),
    )
}

/// The same singlet with a 0.5 stop 3 behind it.
pub(crate) fn rear_stop_singlet() -> System {
    System::new(
        "rear stop singlet",
        Object::infinite(0.05).unwrap(),
        vec![
            Element::surface([0.0, 0.0, 5.0], 3.0, 0.05, bk7()).unwrap(),
            Element::surface([0.0, 0.0, 2.0], 3.0, -0.05, Material::air()).unwrap(),
            Element::aperture([0.0, 0.0, 3.0], 0.5).unwrap(),
        ],
        Element::image([0.0, 0.0, 16.0], 5.0).unwrap(),
    )
}
