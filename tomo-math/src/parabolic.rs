//! Three-point parabolic refinement of a discretely sampled minimum.
//!
//! Given an objective evaluated on an ordered set of abscissae, the sample
//! with the lowest value only locates the minimum to within one sample
//! spacing. Fitting a parabola through that sample and its two neighbours
//! recovers the vertex with sub-sample precision.

use thiserror::Error;

/// Relative threshold below which the Lagrange denominator is treated as zero.
const DENOMINATOR_EPSILON: f64 = 1e-12;

/// Errors from invalid inputs to [`parabolic_minimum`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParabolicError {
    #[error("values ({values}) and space ({space}) must have the same length")]
    LengthMismatch { values: usize, space: usize },
    #[error("index {index} is out of range for {len} samples")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Refine the location of a sampled minimum with a parabolic fit.
///
/// When `index` is strictly interior, a parabola is fitted through
/// `(space[index-1..=index+1], values[index-1..=index+1])` and its vertex
/// abscissa `-B / 2A` is returned. At either boundary, or when the three
/// points are degenerate (coincident abscissae, collinear values), the
/// unrefined `space[index]` is returned instead. The result is always finite
/// when the inputs are.
///
/// # Arguments
/// * `values` - Objective values, one per abscissa
/// * `index` - Index of the sample to refine (normally the arg-min)
/// * `space` - Abscissae the objective was sampled at
pub fn parabolic_minimum(
    values: &[f64],
    index: usize,
    space: &[f64],
) -> Result<f64, ParabolicError> {
    if values.len() != space.len() {
        return Err(ParabolicError::LengthMismatch {
            values: values.len(),
            space: space.len(),
        });
    }
    if index >= values.len() {
        return Err(ParabolicError::IndexOutOfRange {
            index,
            len: values.len(),
        });
    }

    let fallback = space[index];
    if index == 0 || index == values.len() - 1 {
        return Ok(fallback);
    }

    let (x0, x1, x2) = (space[index - 1], space[index], space[index + 1]);
    let (y0, y1, y2) = (values[index - 1], values[index], values[index + 1]);

    let denom = (x0 - x1) * (x0 - x2) * (x1 - x2);
    let scale = (x2 - x0).abs().powi(3);
    if denom.is_nan() || denom.abs() <= DENOMINATOR_EPSILON * scale {
        return Ok(fallback);
    }

    let a = (x2 * (y1 - y0) + x1 * (y0 - y2) + x0 * (y2 - y1)) / denom;
    let b = (x2 * x2 * (y0 - y1) + x1 * x1 * (y2 - y0) + x0 * x0 * (y1 - y2)) / denom;

    if a == 0.0 {
        return Ok(fallback);
    }

    let vertex = -b / (2.0 * a);
    if vertex.is_finite() {
        Ok(vertex)
    } else {
        Ok(fallback)
    }
}
