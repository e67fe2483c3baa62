//! Axis-generic operations on 3D stacks.
//!
//! Projection stacks are indexed `[row, angle, column]` and volumes
//! `[slice, row, column]`; these helpers take the axis as a runtime value so
//! the same code serves both layouts.

use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, Axis, Slice};
use thiserror::Error;

/// Errors from shape-dependent array operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArrayError {
    #[error("axis {axis} is out of range for a {ndim}-dimensional array")]
    AxisOutOfRange { axis: usize, ndim: usize },
    #[error("index {index} is out of range for an axis of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("cannot crop {requested} elements from an axis of length {len}")]
    CropTooLarge { requested: usize, len: usize },
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
}

pub(crate) fn check_axis(axis: usize) -> Result<Axis, ArrayError> {
    if axis < 3 {
        Ok(Axis(axis))
    } else {
        Err(ArrayError::AxisOutOfRange { axis, ndim: 3 })
    }
}

/// 2D view of slice `index` along `axis`.
pub fn slice_along<'a>(
    array: &ArrayView3<'a, f32>,
    index: usize,
    axis: usize,
) -> Result<ArrayView2<'a, f32>, ArrayError> {
    let ax = check_axis(axis)?;
    let len = array.len_of(ax);
    if index >= len {
        return Err(ArrayError::IndexOutOfRange { index, len });
    }
    Ok(array.clone().index_axis_move(ax, index))
}

/// Zero-pad `array` along `axis` with `before` and `after` elements.
pub fn pad_axis(
    array: &ArrayView3<f32>,
    axis: usize,
    before: usize,
    after: usize,
) -> Result<Array3<f32>, ArrayError> {
    let ax = check_axis(axis)?;
    let mut shape = array.raw_dim();
    let len = shape[axis];
    shape[axis] = len + before + after;

    let mut out = Array3::zeros(shape);
    out.slice_axis_mut(ax, Slice::from(before..before + len))
        .assign(array);
    Ok(out)
}

/// Zero-pad a 2D image on its trailing edges to `(rows, cols)`.
pub fn pad_image(image: &ArrayView2<f32>, rows: usize, cols: usize) -> Result<Array2<f32>, ArrayError> {
    let (r, c) = image.dim();
    if r > rows || c > cols {
        return Err(ArrayError::DimensionMismatch {
            expected: vec![rows, cols],
            actual: vec![r, c],
        });
    }
    let mut out = Array2::zeros((rows, cols));
    out.slice_mut(s![..r, ..c]).assign(image);
    Ok(out)
}

/// Remove `before` leading and `after` trailing elements along `axis`.
pub fn crop_axis(
    array: &ArrayView3<f32>,
    axis: usize,
    before: usize,
    after: usize,
) -> Result<Array3<f32>, ArrayError> {
    let ax = check_axis(axis)?;
    let len = array.len_of(ax);
    if before + after > len {
        return Err(ArrayError::CropTooLarge {
            requested: before + after,
            len,
        });
    }
    Ok(array
        .slice_axis(ax, Slice::from(before..len - after))
        .to_owned())
}

/// Sum adjacent pairs along `axis`, halving its length; an odd trailing element is dropped.
pub fn bin_axis(array: &ArrayView3<f32>, axis: usize) -> Result<Array3<f32>, ArrayError> {
    let ax = check_axis(axis)?;
    let half = array.len_of(ax) / 2;
    let even = array.slice_axis(ax, Slice::new(0, Some(2 * half as isize), 2));
    let odd = array.slice_axis(ax, Slice::new(1, Some(2 * half as isize), 2));
    Ok(&even + &odd)
}

/// Multiply every slice along `axis` by the matching entry of `vector`.
pub fn multiply_along(
    array: &mut Array3<f32>,
    vector: &[f32],
    axis: usize,
) -> Result<(), ArrayError> {
    let ax = check_axis(axis)?;
    let len = array.len_of(ax);
    if vector.len() != len {
        return Err(ArrayError::DimensionMismatch {
            expected: vec![len],
            actual: vec![vector.len()],
        });
    }
    for (mut slice, &factor) in array.axis_iter_mut(ax).zip(vector) {
        slice.mapv_inplace(|v| v * factor);
    }
    Ok(())
}
