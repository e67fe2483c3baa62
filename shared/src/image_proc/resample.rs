//! Linear-interpolation resampling of 2D images.
//!
//! Both transforms pull each output pixel from a fractional source position
//! and fill anything that maps outside the input with zero.

use ndarray::{Array2, ArrayView2};

/// Tolerance for source positions that land a rounding error past the edge.
const EDGE_TOLERANCE: f64 = 1e-9;

/// Bilinear sample of `image` at fractional `(row, col)`; zero outside.
pub fn sample_bilinear(image: &ArrayView2<f32>, row: f64, col: f64) -> f32 {
    let (rows, cols) = image.dim();
    if rows == 0 || cols == 0 {
        return 0.0;
    }
    let max_r = (rows - 1) as f64;
    let max_c = (cols - 1) as f64;
    if row < -EDGE_TOLERANCE
        || col < -EDGE_TOLERANCE
        || row > max_r + EDGE_TOLERANCE
        || col > max_c + EDGE_TOLERANCE
    {
        return 0.0;
    }
    let row = row.clamp(0.0, max_r);
    let col = col.clamp(0.0, max_c);

    let r0 = row.floor() as usize;
    let c0 = col.floor() as usize;
    let r1 = (r0 + 1).min(rows - 1);
    let c1 = (c0 + 1).min(cols - 1);
    let fr = row - r0 as f64;
    let fc = col - c0 as f64;

    let top = image[[r0, c0]] as f64 * (1.0 - fc) + image[[r0, c1]] as f64 * fc;
    let bottom = image[[r1, c0]] as f64 * (1.0 - fc) + image[[r1, c1]] as f64 * fc;
    (top * (1.0 - fr) + bottom * fr) as f32
}

/// Translate an image by `(d_row, d_col)` pixels.
///
/// Content at `(r, c)` moves to `(r + d_row, c + d_col)`; vacated pixels
/// become zero.
pub fn shift_image(image: &ArrayView2<f32>, d_row: f64, d_col: f64) -> Array2<f32> {
    Array2::from_shape_fn(image.dim(), |(r, c)| {
        sample_bilinear(image, r as f64 - d_row, c as f64 - d_col)
    })
}

/// Rotate an image by `angle_deg` degrees about its centre.
///
/// Positive angles rotate content counter-clockwise as displayed with row
/// zero at the top. The output keeps the input shape.
pub fn rotate_image(image: &ArrayView2<f32>, angle_deg: f64) -> Array2<f32> {
    let (rows, cols) = image.dim();
    let centre_r = (rows as f64 - 1.0) / 2.0;
    let centre_c = (cols as f64 - 1.0) / 2.0;
    let (sin, cos) = angle_deg.to_radians().sin_cos();

    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let dy = r as f64 - centre_r;
        let dx = c as f64 - centre_c;
        let src_r = centre_r + sin * dx + cos * dy;
        let src_c = centre_c + cos * dx - sin * dy;
        sample_bilinear(image, src_r, src_c)
    })
}
