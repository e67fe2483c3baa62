//! Rigid per-slice transforms of 3D stacks.

use crate::PreprocessError;
use ndarray::Array3;
use shared::algo::map_slices_in_parallel;
use shared::image_proc::{rotate_image, shift_image};

/// Translate every slice perpendicular to `axis` by `shift` pixels
/// (linear interpolation, zero fill).
pub fn translate(data: &mut Array3<f32>, shift: (f64, f64), axis: usize) -> Result<(), PreprocessError> {
    log::info!("Applying translation ({:.3}, {:.3}) px", shift.0, shift.1);
    map_slices_in_parallel(data, axis, |slice| shift_image(&slice, shift.0, shift.1))?;
    Ok(())
}

/// Rotate every slice perpendicular to `axis` by `degrees` about its centre.
pub fn rotate(data: &mut Array3<f32>, degrees: f64, axis: usize) -> Result<(), PreprocessError> {
    log::info!("Applying rotation of {degrees:.3} degrees");
    map_slices_in_parallel(data, axis, |slice| rotate_image(&slice, degrees))?;
    Ok(())
}
