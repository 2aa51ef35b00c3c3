//! Integration tests for the lens design pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end workflow: assemble a system from elements, aim
//!   chief and marginal rays, build ray bundles, and optimize the design
//!   against a merit function.
//! - Exercise realistic settings (finite apertures, off-axis fields, both
//!   aiming strategies, several solvers) rather than toy edge cases only.
//!
//! Coverage
//! --------
//! - `optics` / `system`: construction, exact tracing, paraxial trace.
//! - `aiming`: `ray_bundle` with paraxial and exact strategies.
//! - `optimization`: `optimize` with spot-size and focal-length demerits,
//!   bounds, and constraint penalties.
//!
//! Exclusions
//! ----------
//! - Low-level element math and option validation; those are covered by
//!   unit tests.
use approx::assert_abs_diff_eq;
use optrace::{
    aiming::{AimOptions, ray_bundle},
    optics::{Element, Material, Object, Rays},
    optimization::{
        errors::OptError,
        lens_optimizer::{LineSearcher, Method, OptimizeOptions, Tolerances, optimize},
        merit::{Curvature, FocalLength, Merit, MinSpacing, RmsSpot, Spacing, Target},
    },
    system::{ParaxialTrace, System, TraceError},
};

/// Purpose
/// -------
/// Biconvex BK7 singlet with a unit stop 5 in front of it, object at
/// infinity, and the image plane 19 behind the rear vertex.
///
/// Usage
/// -----
/// - Shared by every test here; individual tests move the image plane or
///   drop the stop as needed.
fn singlet() -> System {
    let bk7 = Material::glass("N-BK7", 1.5168, 64.17).expect("BK7 should be valid");
    System::new(
        "singlet",
        Object::infinite(0.05).expect("field angle should be valid"),
        vec![
            Element::aperture([0.0, 0.0, 5.0], 1.0).expect("stop should be valid"),
            Element::surface([0.0, 0.0, 5.0], 3.0, 0.05, bk7).expect("front surface"),
            Element::surface([0.0, 0.0, 2.0], 3.0, -0.05, Material::air()).expect("rear surface"),
        ],
        Element::image([0.0, 0.0, 19.0], 5.0).expect("image should be valid"),
    )
}

fn bundles(system: &System, opts: &AimOptions) -> Vec<Rays> {
    let wavelength = system.primary_wavelength();
    [[0.0, 0.0], [0.0, 0.7]]
        .into_iter()
        .map(|h| ray_bundle(system, wavelength, h, 9, opts).expect("aiming should succeed"))
        .collect()
}

#[test]
// Purpose
// -------
// Refocusing on aimed bundles reduces the spot size and moves the image
// plane towards best focus.
//
// Given
// -----
// - On-axis and 0.7-field bundles aimed exactly.
// - Image spacing bounded to (10, 30), RMS spot demerit.
//
// Expect
// ------
// - Objective strictly decreases.
// - The system's image spacing matches the reported optimum.
// - The paraxial focus lies close to the new image plane.
fn refocus_on_aimed_bundles_reduces_spot() {
    // Arrange
    let mut system = singlet();
    let rays = bundles(&system, &AimOptions::exact());
    assert!(rays.iter().all(|r| !r.is_empty()));
    let merit = Merit::new()
        .with_parameter(Spacing::new(Target::Image).with_bounds(Some(10.0), Some(30.0)))
        .with_demerit(RmsSpot::new());
    let tols = Tolerances::new(None, Some(1e-14), Some(400)).expect("tolerances");
    let opts = OptimizeOptions::new(tols, Method::NelderMead, false, None).expect("options");

    // Act
    let out = optimize(&mut system, &rays, &merit, &opts).expect("optimize should succeed");

    // Assert
    assert!(out.objective < out.initial_objective);
    assert_eq!(out.residuals.len(), 2);
    assert_abs_diff_eq!(system.image.origin[2], out.x[0], epsilon = 1e-12);
    let focus = ParaxialTrace::new(&system).expect("paraxial trace").paraxial_focus();
    assert!(focus.abs() < 2.0, "x = {}, focus offset = {focus}", out.x[0]);
}

#[test]
// Purpose
// -------
// Paraxially aimed bundles support a curvature + spacing solve to a
// focal-length target, with a minimum back focal distance enforced by
// penalty.
//
// Expect
// ------
// - Focal length within 1e-2 of the target.
// - Image spacing respects the floor within the penalty's tolerance.
fn focal_length_solve_with_spacing_floor() {
    // Arrange
    let mut system = singlet();
    let rays = bundles(&system, &AimOptions::default());
    let start = ParaxialTrace::new(&system).expect("paraxial trace").focal_length();
    let target = 0.95 * start;
    let merit = Merit::new()
        .with_parameter(Curvature::new(1).with_bounds(Some(0.0), Some(0.2)).with_scale(0.01))
        .with_parameter(Spacing::new(Target::Image).with_bounds(Some(5.0), Some(40.0)))
        .with_demerit(FocalLength::new(target).with_weight(10.0))
        .with_demerit(RmsSpot::new())
        .with_constraint(MinSpacing::new(Target::Image, 12.0));
    let tols = Tolerances::new(Some(1e-10), Some(1e-14), Some(500)).expect("tolerances");
    let opts = OptimizeOptions::new(tols, Method::Lbfgs(LineSearcher::HagerZhang), false, None)
        .and_then(|o| o.with_penalty(1e4))
        .expect("options");

    // Act
    let out = optimize(&mut system, &rays, &merit, &opts).expect("optimize should succeed");

    // Assert
    let efl = ParaxialTrace::new(&system).expect("paraxial trace").focal_length();
    assert_abs_diff_eq!(efl, target, epsilon = 1e-2);
    assert!(system.image.origin[2] > 12.0 - 1e-2);
    assert!(out.objective < out.initial_objective);
    assert_eq!(out.x.len(), 2);
}

#[test]
// Purpose
// -------
// Configuration problems surface as typed errors at the right layer and
// leave the caller's system untouched.
fn configuration_errors_surface_cleanly() {
    // Arrange
    let base = singlet();
    let stopless = System::new(
        "stopless",
        base.object.clone(),
        base.elements()[1..].to_vec(),
        base.image.clone(),
    );
    let mut system = singlet();
    let merit = Merit::new()
        .with_parameter(Spacing::new(Target::Image).with_bounds(Some(30.0), Some(10.0)))
        .with_demerit(RmsSpot::new());

    // Act
    let aim_err =
        ray_bundle(&stopless, stopless.primary_wavelength(), [0.0, 0.0], 5, &AimOptions::default())
            .unwrap_err();
    let opt_err = optimize(&mut system, &[], &merit, &OptimizeOptions::default()).unwrap_err();

    // Assert
    assert!(matches!(
        OptError::from(aim_err),
        OptError::Aim(optrace::aiming::AimError::Trace(TraceError::ApertureCount { .. }))
    ));
    assert!(matches!(opt_err, OptError::InvalidBounds { .. }));
    assert_eq!(system.image.origin[2], 19.0);
}
