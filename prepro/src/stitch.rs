//! Compositing of detector tiles into a larger projection stack.

use crate::config::ShiftEstimatorConfig;
use crate::shift::estimate_shift;
use crate::PreprocessError;
use ndarray::{Array3, ArrayView3, Axis, Zip};
use rayon::prelude::*;
use shared::algo::{pad_image, ArrayError};
use shared::image_proc::shift_image;
use shared::Geometry;

/// Pixel offset of a tile's origin in the total stack, from the detector
/// positions of both geometries.
///
/// Rounds half to even.
pub fn nominal_offset(
    tile_shape: (usize, usize),
    geometry: &Geometry,
    total_shape: (usize, usize),
    total_geometry: &Geometry,
) -> (isize, isize) {
    let (det_h, det_w) = geometry.detector_size(tile_shape.0, tile_shape.1);
    let (total_h, total_w) = total_geometry.detector_size(total_shape.0, total_shape.1);
    let pixel = geometry.det_pixel();

    let x = ((geometry.det_hrz() - total_geometry.det_hrz()) + total_w / 2.0 - det_w / 2.0) / pixel;
    let y = ((geometry.det_vrt() - total_geometry.det_vrt()) + total_h / 2.0 - det_h / 2.0) / pixel;
    (y.round_ties_even() as isize, x.round_ties_even() as isize)
}

/// Append a tile to the total projection stack in place.
///
/// Both stacks are indexed `[row, angle, column]` and must have the same
/// number of angles. The tile is placed at its nominal detector offset,
/// refined by [`estimate_shift`] against the current total, and merged
/// with an element-wise maximum.
///
/// # Errors
/// [`PreprocessError::DimensionMismatch`] if the angle counts differ or the
/// tile is larger than the total along rows or columns.
pub fn append_tile(
    data: &ArrayView3<f32>,
    geometry: &Geometry,
    total: &mut Array3<f32>,
    total_geometry: &Geometry,
    config: &ShiftEstimatorConfig,
) -> Result<(), PreprocessError> {
    let (rows, angles, cols) = data.dim();
    let (total_rows, total_angles, total_cols) = total.dim();
    if angles != total_angles {
        return Err(PreprocessError::DimensionMismatch(format!(
            "tile has {angles} angles, total has {total_angles}"
        )));
    }
    if rows > total_rows || cols > total_cols {
        return Err(PreprocessError::DimensionMismatch(format!(
            "tile ({rows} x {cols}) does not fit in total ({total_rows} x {total_cols})"
        )));
    }

    let (y_offset, x_offset) =
        nominal_offset((rows, cols), geometry, (total_rows, total_cols), total_geometry);
    log::info!("Stitching a tile at nominal offset ({y_offset}, {x_offset}) px");

    let estimate = estimate_shift(&total.view(), data, (y_offset, x_offset), 1, config)?;
    let dy = y_offset as f64 + estimate.shift.0;
    let dx = x_offset as f64 + estimate.shift.1;
    log::debug!("Applying offset ({dy:.2}, {dx:.2}) px");

    total
        .axis_iter_mut(Axis(1))
        .into_par_iter()
        .zip(data.axis_iter(Axis(1)).into_par_iter())
        .try_for_each(|(mut base, tile)| -> Result<(), ArrayError> {
            let mut projection = pad_image(&tile, total_rows, total_cols)?;
            if dy != 0.0 || dx != 0.0 {
                projection = shift_image(&projection.view(), dy, dx);
            }
            Zip::from(&mut base)
                .and(&projection)
                .for_each(|b, &p| *b = (*b).max(p));
            Ok(())
        })?;

    Ok(())
}
