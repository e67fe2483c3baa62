//! Exhaustive search over trial values with parabolic refinement.

use crate::cost::reconstruction_cost;
use crate::PreprocessError;
use ndarray::ArrayView3;
use shared::{Geometry, GeometryParameter, Reconstructor, Subsample};
use tomo_math::parabolic_minimum;

/// Evaluate the cost at every value (in order) and return the refined minimum.
///
/// The sampled minimum is refined by a parabola through it and its two
/// neighbours; a minimum on either end of `values` is returned unrefined.
/// Any failed reconstruction aborts the search.
pub fn subsampled_search<R: Reconstructor + ?Sized>(
    reconstructor: &R,
    values: &[f64],
    projections: &ArrayView3<f32>,
    geometry: &Geometry,
    subsample: Subsample,
    key: GeometryParameter,
) -> Result<f64, PreprocessError> {
    let (first, last) = match (values.first(), values.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            return Err(PreprocessError::Configuration(
                "search needs at least one trial value".to_string(),
            ))
        }
    };
    log::info!("Searching {key} from {first:.3} to {last:.3} ({subsample})");

    let costs = values
        .iter()
        .map(|&value| {
            reconstruction_cost(reconstructor, projections, geometry, subsample, value, key)
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let best = costs
        .iter()
        .enumerate()
        .fold(0, |best, (i, &cost)| if cost < costs[best] { i } else { best });

    Ok(parabolic_minimum(&costs, best, values)?)
}
