//! Residual ring artefact suppression.

use ndarray::{Array2, Array3, Axis};
use rayon::prelude::*;
use shared::image_proc::median_filter;

/// Remove fixed-pattern detector residuals that show up as rings.
///
/// The fine-scale residual `projection - median_filter(projection, kernel)`
/// is averaged over all angles; what survives the average is static in
/// detector coordinates and is subtracted from every projection.
pub fn remove_residual_rings(data: &mut Array3<f32>, kernel: (usize, usize)) {
    let (rows, angles, cols) = data.dim();
    if angles == 0 {
        return;
    }
    log::info!("Estimating residual rings with a {kernel:?} median kernel");

    let residual = data
        .axis_iter(Axis(1))
        .into_par_iter()
        .map(|projection| &projection - &median_filter(&projection, kernel))
        .reduce(|| Array2::zeros((rows, cols)), |a, b| a + b)
        / angles as f32;

    for mut projection in data.axis_iter_mut(Axis(1)) {
        projection -= &residual;
    }
    log::info!("Residual ring correction applied");
}
