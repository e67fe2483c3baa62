//! Parallel-beam forward projection.

use crate::SimulationError;
use ndarray::{Array3, ArrayView3, Axis};
use rayon::prelude::*;
use shared::image_proc::{rotate_image, shift_image};

/// Project a `[slice, row, column]` volume into a `[row, angle, column]` stack.
///
/// Each slice is rotated by every angle in `thetas_deg` and summed along its
/// rows. `axis_offset_px` displaces the rotation axis horizontally on the
/// detector, shifting every projection by that many columns.
pub fn parallel_project(
    volume: &ArrayView3<f32>,
    thetas_deg: &[f64],
    axis_offset_px: f64,
) -> Result<Array3<f32>, SimulationError> {
    if thetas_deg.is_empty() {
        return Err(SimulationError::InvalidProjection(
            "at least one projection angle is required".to_string(),
        ));
    }
    if volume.is_empty() {
        return Err(SimulationError::InvalidProjection(
            "volume is empty".to_string(),
        ));
    }
    if !axis_offset_px.is_finite() {
        return Err(SimulationError::InvalidProjection(format!(
            "axis offset must be finite, got {axis_offset_px}"
        )));
    }

    let (slices, _, cols) = volume.dim();
    log::debug!(
        "Projecting {slices} slices over {} angles (axis offset {axis_offset_px} px)",
        thetas_deg.len()
    );

    let mut stack = Array3::<f32>::zeros((slices, thetas_deg.len(), cols));
    stack
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(volume.axis_iter(Axis(0)).into_par_iter())
        .for_each(|(mut sinogram, slice)| {
            for (mut line, &theta) in sinogram.axis_iter_mut(Axis(0)).zip(thetas_deg) {
                line.assign(&rotate_image(&slice, theta).sum_axis(Axis(0)));
            }
            if axis_offset_px != 0.0 {
                let shifted = shift_image(&sinogram.view(), 0.0, axis_offset_px);
                sinogram.assign(&shifted);
            }
        });

    Ok(stack)
}
