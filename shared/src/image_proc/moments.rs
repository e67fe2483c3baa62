//! Intensity moments of 3D data stacks.
//!
//! Coordinates are measured from the middle sample `len / 2` (integer
//! division) of each axis, so a blob centred in an odd-sized stack has a
//! centre of mass of zero.

use ndarray::{ArrayView3, Axis};

/// Axis coordinate of sample `index` relative to the middle of the axis.
#[inline]
fn centred_coordinate(index: usize, len: usize) -> f64 {
    index as f64 - (len / 2) as f64
}

/// Compute the moment `Σ (x - x0)^power · data` along `axis`.
///
/// # Panics
/// Panics if `axis` is not 0, 1 or 2.
pub fn moment(data: &ArrayView3<f32>, power: i32, axis: usize) -> f64 {
    let len = data.len_of(Axis(axis));
    data.axis_iter(Axis(axis))
        .enumerate()
        .map(|(i, slab)| {
            let weight = centred_coordinate(i, len).powi(power);
            weight * slab.iter().map(|&v| v as f64).sum::<f64>()
        })
        .sum()
}

/// Centre of mass of the squared intensities, one coordinate per axis.
///
/// Squaring the data makes the estimate insensitive to sign and emphasises
/// bright structure over a faint background. Returns `None` when the stack
/// carries no signal.
pub fn centre_of_mass(data: &ArrayView3<f32>) -> Option<[f64; 3]> {
    let squared = data.mapv(|v| v * v);
    let total: f64 = squared.iter().map(|&v| v as f64).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let view = squared.view();
    Some([
        moment(&view, 1, 0) / total,
        moment(&view, 1, 1) / total,
        moment(&view, 1, 2) / total,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array3;

    #[test]
    fn test_moment_zero_is_total() {
        let data = Array3::<f32>::from_elem((2, 3, 4), 0.5);
        assert_abs_diff_eq!(moment(&data.view(), 0, 1), 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_first_moment_of_centred_point_is_zero() {
        let mut data = Array3::<f32>::zeros((5, 5, 5));
        data[[2, 2, 2]] = 3.0;
        for axis in 0..3 {
            assert_eq!(moment(&data.view(), 1, axis), 0.0);
        }
    }

    #[test]
    fn test_centre_of_mass_offset_point() {
        let mut data = Array3::<f32>::zeros((4, 6, 8));
        data[[1, 4, 7]] = -2.0;
        let com = centre_of_mass(&data.view()).unwrap();

        assert_abs_diff_eq!(com[0], -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(com[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(com[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_centre_of_mass_weights_by_square() {
        let mut data = Array3::<f32>::zeros((1, 1, 5));
        data[[0, 0, 0]] = 1.0;
        data[[0, 0, 4]] = 2.0;
        let com = centre_of_mass(&data.view()).unwrap();

        // weights 1 and 4 at coordinates -2 and +2
        assert_abs_diff_eq!(com[2], (-2.0 + 8.0) / 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_centre_of_mass_empty_stack() {
        let data = Array3::<f32>::zeros((3, 3, 3));
        assert!(centre_of_mass(&data.view()).is_none());
    }
}
