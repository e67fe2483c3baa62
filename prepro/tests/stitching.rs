//! Tile stitching into a total projection stack.

use ndarray::{s, Array3};
use prepro::{append_tile, ShiftEstimatorConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{Geometry, GeometryParameter};

const PIXEL: f64 = 0.5;

fn geometry(det_hrz: f64, det_vrt: f64) -> Geometry {
    Geometry::new(PIXEL, 200.0, 50.0)
        .unwrap()
        .with_parameter(GeometryParameter::DetectorHorizontal, det_hrz)
        .unwrap()
        .with_parameter(GeometryParameter::DetectorVertical, det_vrt)
        .unwrap()
}

/// Detector position placing a tile `tile_len` pixels long at pixel `offset`
/// of a total `total_len` pixels long centred at zero. Works for either axis.
fn det_position(offset: usize, tile_len: usize, total_len: usize) -> f64 {
    offset as f64 * PIXEL - (total_len as f64 - tile_len as f64) * PIXEL / 2.0
}

#[test]
fn test_identical_region_is_unchanged() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut rng = StdRng::seed_from_u64(9);
    let mut total = Array3::from_shape_fn((20, 3, 30), |_| rng.gen_range(0.5f32..1.5));
    let before = total.clone();
    let tile = total.slice(s![.., .., 5..17]).to_owned();

    append_tile(
        &tile.view(),
        &geometry(det_position(5, 12, 30), 0.0),
        &mut total,
        &geometry(0.0, 0.0),
        &ShiftEstimatorConfig::default(),
    )
    .unwrap();

    assert_eq!(total, before);
}

#[test]
fn test_overlap_takes_maximum() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut total = Array3::<f32>::zeros((10, 2, 10));
    let centred = geometry(0.0, 0.0);
    let config = ShiftEstimatorConfig::default();

    let tile_a = Array3::<f32>::from_elem((10, 2, 10), 5.0);
    append_tile(&tile_a.view(), &centred, &mut total, &centred, &config).unwrap();
    assert!(total.iter().all(|&v| v == 5.0));

    let tile_b = Array3::<f32>::from_elem((10, 2, 10), 10.0);
    append_tile(&tile_b.view(), &centred, &mut total, &centred, &config).unwrap();
    assert!(total.iter().all(|&v| v == 10.0));

    // a dimmer tile does not lower the composite
    append_tile(&tile_a.view(), &centred, &mut total, &centred, &config).unwrap();
    assert!(total.iter().all(|&v| v == 10.0));
}

#[test]
fn test_two_overlapping_tiles_rebuild_the_field() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (rows, angles, cols) = (24, 5, 60);
    let field = Array3::from_shape_fn((rows, angles, cols), |(r, a, c)| {
        2.0 + (0.3 * c as f32 + 0.2 * r as f32 + 0.05 * a as f32).sin()
    });
    let left = field.slice(s![.., .., 0..36]).to_owned();
    let right = field.slice(s![.., .., 24..60]).to_owned();

    let total_geometry = geometry(0.0, 0.0);
    let config = ShiftEstimatorConfig::default();
    let mut total = Array3::<f32>::zeros((rows, angles, cols));

    append_tile(
        &left.view(),
        &geometry(det_position(0, 36, cols), 0.0),
        &mut total,
        &total_geometry,
        &config,
    )
    .unwrap();
    assert_eq!(total.slice(s![.., .., 36..]).sum(), 0.0);

    append_tile(
        &right.view(),
        &geometry(det_position(24, 36, cols), 0.0),
        &mut total,
        &total_geometry,
        &config,
    )
    .unwrap();

    for (a, b) in total.iter().zip(field.iter()) {
        assert!((a - b).abs() < 1e-5);
    }
}

#[test]
fn test_misplaced_tile_is_pulled_into_place() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (rows, angles, cols) = (48, 32, 80);
    let mut rng = StdRng::seed_from_u64(31);
    let field = Array3::from_shape_fn((rows, angles, cols), |_| rng.gen_range(0.5f32..1.5));
    let left = field.slice(s![.., .., 0..48]).to_owned();
    // the second tile truly starts at (4, 28)
    let right = field.slice(s![4..44, .., 28..80]).to_owned();

    let total_geometry = geometry(0.0, 0.0);
    let config = ShiftEstimatorConfig {
        slice_stride: 8,
        ..Default::default()
    };
    let mut total = Array3::<f32>::zeros((rows, angles, cols));

    append_tile(
        &left.view(),
        &geometry(det_position(0, 48, cols), 0.0),
        &mut total,
        &total_geometry,
        &config,
    )
    .unwrap();

    // the recorded detector position is one pixel short on both axes, so the
    // nominal offset is (3, 27)
    let reported = geometry(det_position(27, 52, cols), det_position(3, 40, rows));
    append_tile(&right.view(), &reported, &mut total, &total_geometry, &config).unwrap();

    let expected = Array3::from_shape_fn((rows, angles, cols), |(r, a, c)| {
        if c < 48 || (4..44).contains(&r) {
            field[[r, a, c]]
        } else {
            0.0
        }
    });
    let worst = total
        .iter()
        .zip(expected.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0f32, f32::max);
    // a one-pixel misplacement of this field leaves errors near 1
    assert!(worst < 0.1, "largest stitching error {worst}");
}
