//! Air (background) intensity removal.
//!
//! The air value is the most populated histogram bin of each projection's
//! border, which is assumed to see only air. The largest such value over
//! all projections is subtracted.

use crate::config::AirConfig;
use crate::PreprocessError;
use ndarray::{s, Array3, ArrayView2, ArrayView3, Axis};
use rayon::prelude::*;
use tomo_math::histogram;

/// Collect the pixels of a border `width` pixels wide (corners appear twice).
fn border_pixels(image: &ArrayView2<f32>, width: usize) -> Vec<f64> {
    let (rows, cols) = image.dim();
    let wr = width.min(rows);
    let wc = width.min(cols);
    [
        image.slice(s![..wr, ..]),
        image.slice(s![rows - wr.., ..]),
        image.slice(s![.., cols - wc..]),
        image.slice(s![.., ..wc]),
    ]
    .iter()
    .flat_map(|part| part.iter().map(|&v| v as f64))
    .collect()
}

/// Estimate the air intensity of a projection stack.
pub fn estimate_air(data: &ArrayView3<f32>, config: &AirConfig) -> Result<f32, PreprocessError> {
    if config.border == 0 {
        return Err(PreprocessError::Configuration(
            "air border must be at least one pixel wide".to_string(),
        ));
    }
    if data.len_of(Axis(1)) == 0 {
        return Err(PreprocessError::DimensionMismatch(
            "cannot estimate air without projections".to_string(),
        ));
    }

    let modes = data
        .axis_iter(Axis(1))
        .into_par_iter()
        .map(|projection| -> Result<f64, PreprocessError> {
            let (centres, counts) = histogram(
                border_pixels(&projection, config.border),
                config.bins,
                config.range,
            )?;
            let mode = counts
                .iter()
                .enumerate()
                .fold(0, |best, (i, &n)| if n > counts[best] { i } else { best });
            Ok(centres[mode])
        })
        .collect::<Result<Vec<f64>, PreprocessError>>()?;

    let air = modes.into_iter().fold(f64::NEG_INFINITY, f64::max);
    Ok(air as f32)
}

/// Subtract the air intensity from every projection, clamping at zero.
///
/// When `air` is `None` it is estimated with [`estimate_air`]. Returns the
/// value that was subtracted.
pub fn subtract_air(
    data: &mut Array3<f32>,
    air: Option<f32>,
    config: &AirConfig,
) -> Result<f32, PreprocessError> {
    let air = match air {
        Some(value) => value,
        None => estimate_air(&data.view(), config)?,
    };
    log::info!("Subtracting air intensity {air:.6}");
    data.par_mapv_inplace(|v| (v - air).max(0.0));
    Ok(air)
}
