//! End-to-end rotation-axis search against the mock reconstruction oracle.
//!
//! `MockReconstructor` ignores the projection values it is given: the search is
//! checked against the oracle's synthetic sharpness curve, and the simulated
//! projections only feed the centre-of-mass starting guess.

use approx::assert_abs_diff_eq;
use ndarray::Array3;
use prepro::{optimize_rotation_center, PreprocessError, RotationSearchConfig};
use shared::{Geometry, MockReconstructor};
use simulator::{parallel_project, phantom, Phantom};

const TRUE_AXIS_MM: f64 = 1.37;

/// Pixel 0.4 mm at magnification 2: one object-plane pixel is 0.2 mm.
fn geometry() -> Geometry {
    Geometry::new(0.4, 100.0, 100.0).unwrap()
}

fn pearl() -> Array3<f32> {
    phantom((40, 48, 48), Phantom::Pearl { radius: 10.0 }).unwrap()
}

/// Projections of the pearl with the axis displaced by the true offset.
fn projections(volume: &Array3<f32>, geometry: &Geometry) -> Array3<f32> {
    let thetas: Vec<f64> = (0..36).map(|i| i as f64 * 10.0).collect();
    let offset_px = TRUE_AXIS_MM / geometry.pixel_footprint();
    parallel_project(&volume.view(), &thetas, offset_px).unwrap()
}

#[test]
fn test_converges_to_true_axis_from_zero_guess() {
    let _ = env_logger::builder().is_test(true).try_init();

    let volume = pearl();
    let geometry = geometry();
    let projections = projections(&volume, &geometry);
    let oracle = MockReconstructor::new(volume, TRUE_AXIS_MM);

    let axis = optimize_rotation_center(
        &oracle,
        &projections.view(),
        &geometry,
        Some(0.0),
        8,
        true,
        &RotationSearchConfig::default(),
    )
    .unwrap();

    assert_abs_diff_eq!(axis, TRUE_AXIS_MM, epsilon = 0.05);
    // subscale 8, 4, 2, 1 with five trials each
    assert_eq!(oracle.calls(), 20);
}

#[test]
fn test_centre_of_mass_guess_starts_near_axis() {
    let _ = env_logger::builder().is_test(true).try_init();

    let volume = pearl();
    let geometry = geometry();
    let projections = projections(&volume, &geometry);
    let oracle = MockReconstructor::new(volume, TRUE_AXIS_MM);

    let axis = optimize_rotation_center(
        &oracle,
        &projections.view(),
        &geometry,
        None,
        2,
        true,
        &RotationSearchConfig::default(),
    )
    .unwrap();

    assert_abs_diff_eq!(axis, TRUE_AXIS_MM, epsilon = 0.05);
}

#[test]
fn test_subscale_three_is_configuration_error() {
    let volume = pearl();
    let geometry = geometry();
    let projections = Array3::<f32>::ones((48, 4, 48));
    let oracle = MockReconstructor::new(volume, TRUE_AXIS_MM);

    let result = optimize_rotation_center(
        &oracle,
        &projections.view(),
        &geometry,
        Some(0.0),
        3,
        true,
        &RotationSearchConfig::default(),
    );

    assert!(matches!(result, Err(PreprocessError::Configuration(_))));
    assert_eq!(oracle.calls(), 0);
}

#[test]
fn test_oracle_failure_aborts_search() {
    let volume = pearl();
    let geometry = geometry();
    let projections = Array3::<f32>::ones((48, 4, 48));
    let oracle = MockReconstructor::new(volume, TRUE_AXIS_MM).with_failure_after(7);

    let result = optimize_rotation_center(
        &oracle,
        &projections.view(),
        &geometry,
        Some(0.0),
        4,
        false,
        &RotationSearchConfig::default(),
    );

    assert!(matches!(result, Err(PreprocessError::Reconstruction(_))));
    // the failing eighth call ends the search in the second level
    assert_eq!(oracle.calls(), 8);
}
