//! Discrete Laplacian edge filter.

use super::reflect_index;
use ndarray::{Array2, ArrayView2};

/// Compute the Laplacian of an image using the 5-point stencil.
///
/// ```text
///  0  1  0
///  1 -4  1
///  0  1  0
/// ```
///
/// Out-of-range neighbours are mirrored, so a constant image maps to zero
/// everywhere including the border.
pub fn laplace(image: &ArrayView2<f64>) -> Array2<f64> {
    let (rows, cols) = image.dim();
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let (ri, ci) = (r as isize, c as isize);
        let up = image[[reflect_index(ri - 1, rows), c]];
        let down = image[[reflect_index(ri + 1, rows), c]];
        let left = image[[r, reflect_index(ci - 1, cols)]];
        let right = image[[r, reflect_index(ci + 1, cols)]];
        up + down + left + right - 4.0 * image[[r, c]]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_constant_image_is_zero() {
        let image = Array2::from_elem((4, 5), 7.0);
        assert!(laplace(&image.view()).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_single_spike() {
        let mut image = Array2::zeros((3, 3));
        image[[1, 1]] = 1.0;
        let out = laplace(&image.view());

        assert_eq!(out[[1, 1]], -4.0);
        assert_eq!(out[[0, 1]], 1.0);
        assert_eq!(out[[1, 2]], 1.0);
        assert_eq!(out[[0, 0]], 0.0);
    }

    #[test]
    fn test_linear_ramp_interior_is_zero() {
        let image = array![[0.0, 1.0, 2.0, 3.0], [0.0, 1.0, 2.0, 3.0]];
        let out = laplace(&image.view());
        assert_eq!(out[[0, 1]], 0.0);
        assert_eq!(out[[1, 2]], 0.0);
        // Mirrored border sees a one-sided difference
        assert_eq!(out[[0, 0]], 1.0);
        assert_eq!(out[[0, 3]], -1.0);
    }
}
