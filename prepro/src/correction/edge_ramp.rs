//! Edge ramps that fade tile borders to zero.

use crate::PreprocessError;
use ndarray::{Array3, Axis};
use shared::algo::{multiply_along, pad_axis};

/// Fade the row and column borders of a projection stack to zero.
///
/// With `extend`, the stack is padded by `width.0` rows and `width.1`
/// columns on each side, with values falling linearly from the edge pixel
/// to zero (the input samples are untouched). Without `extend`, the outer
/// `width` pixels themselves are multiplied by a 0 to 1 ramp.
pub fn apply_edge_ramp(
    data: Array3<f32>,
    width: (usize, usize),
    extend: bool,
) -> Result<Array3<f32>, PreprocessError> {
    let (w0, w1) = width;
    if extend {
        let data = ramp_pad(data, 0, w0)?;
        ramp_pad(data, 2, w1)
    } else {
        let mut data = data;
        ramp_margins(&mut data, 0, w0)?;
        ramp_margins(&mut data, 2, w1)?;
        Ok(data)
    }
}

/// Pad `axis` by `width` on both sides with a linear ramp down to zero.
fn ramp_pad(data: Array3<f32>, axis: usize, width: usize) -> Result<Array3<f32>, PreprocessError> {
    if width == 0 {
        return Ok(data);
    }
    let len = data.len_of(Axis(axis));
    if len == 0 {
        return Err(PreprocessError::DimensionMismatch(format!(
            "cannot ramp-pad an empty axis {axis}"
        )));
    }

    let mut padded = pad_axis(&data.view(), axis, width, width)?;
    let first = data.index_axis(Axis(axis), 0);
    let last = data.index_axis(Axis(axis), len - 1);
    for i in 0..width {
        let rising = i as f32 / width as f32;
        let falling = (width - 1 - i) as f32 / width as f32;
        padded
            .index_axis_mut(Axis(axis), i)
            .assign(&first.mapv(|v| v * rising));
        padded
            .index_axis_mut(Axis(axis), width + len + i)
            .assign(&last.mapv(|v| v * falling));
    }
    Ok(padded)
}

/// Multiply the outer `width` samples of `axis` by a 0 to 1 ramp.
fn ramp_margins(data: &mut Array3<f32>, axis: usize, width: usize) -> Result<(), PreprocessError> {
    if width == 0 {
        return Ok(());
    }
    let len = data.len_of(Axis(axis));
    if width > len {
        return Err(PreprocessError::DimensionMismatch(format!(
            "ramp width {width} exceeds axis {axis} length {len}"
        )));
    }

    let ramp = tomo_math::linspace(0.0, 1.0, width);
    let mut profile = vec![1.0f32; len];
    for (i, &value) in ramp.iter().enumerate() {
        profile[i] *= value as f32;
        profile[len - 1 - i] *= value as f32;
    }
    multiply_along(data, &profile, axis)?;
    Ok(())
}
