//! Sharpness cost of a trial reconstruction.

use crate::PreprocessError;
use ndarray::ArrayView3;
use shared::image_proc::gradient_energy;
use shared::{Geometry, GeometryParameter, Reconstructor, Subsample};

/// Cost of reconstructing with `key` set to `value`.
///
/// The geometry is copied with the trial value, the projections are
/// reconstructed at the given subsampling and the cost is the negated
/// gradient energy of the volume: a sharper reconstruction scores lower.
pub fn reconstruction_cost<R: Reconstructor + ?Sized>(
    reconstructor: &R,
    projections: &ArrayView3<f32>,
    geometry: &Geometry,
    subsample: Subsample,
    value: f64,
    key: GeometryParameter,
) -> Result<f64, PreprocessError> {
    let trial = geometry.with_parameter(key, value)?;
    let volume = reconstructor.reconstruct(projections.view(), &trial, subsample)?;
    let cost = -gradient_energy(&volume.view());
    log::debug!("{key} = {value:.4}: cost {cost:.6e}");
    Ok(cost)
}
