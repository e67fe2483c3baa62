//! Sliding-window median filter with mirrored borders.

use super::reflect_index;
use ndarray::{Array2, ArrayView2};

/// Median filter with a `(height, width)` window.
///
/// The window covers rows `r - height/2 ..= r + (height-1)/2` (same for
/// columns). For even-sized windows the upper of the two middle samples is
/// returned. A zero-sized window leaves the image unchanged.
pub fn median_filter(image: &ArrayView2<f32>, window: (usize, usize)) -> Array2<f32> {
    let (height, width) = window;
    if height == 0 || width == 0 {
        return image.to_owned();
    }
    let (rows, cols) = image.dim();
    let half_h = (height / 2) as isize;
    let half_w = (width / 2) as isize;
    let mut samples = Vec::with_capacity(height * width);

    Array2::from_shape_fn((rows, cols), |(r, c)| {
        samples.clear();
        for dr in 0..height as isize {
            let rr = reflect_index(r as isize - half_h + dr, rows);
            for dc in 0..width as isize {
                let cc = reflect_index(c as isize - half_w + dc, cols);
                samples.push(image[[rr, cc]]);
            }
        }
        let mid = samples.len() / 2;
        let (_, median, _) = samples.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
        *median
    })
}
