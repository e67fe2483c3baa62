//! Discrete image gradients and gradient energy.
//!
//! Gradients use second-order central differences in the interior and
//! first-order one-sided differences at the borders, so the output has the
//! same shape as the input. An axis of length one has zero gradient.

use ndarray::{Array2, ArrayView2, ArrayView3, Axis};
use rayon::prelude::*;

/// Derivative of sample `i` from a lane accessor of length `n`.
#[inline]
fn derivative(n: usize, i: usize, at: impl Fn(usize) -> f64) -> f64 {
    if n < 2 {
        0.0
    } else if i == 0 {
        at(1) - at(0)
    } else if i == n - 1 {
        at(n - 1) - at(n - 2)
    } else {
        (at(i + 1) - at(i - 1)) / 2.0
    }
}

/// Row-wise and column-wise gradients `(d/drow, d/dcol)` of an image.
pub fn gradient(image: &ArrayView2<f32>) -> (Array2<f64>, Array2<f64>) {
    let (rows, cols) = image.dim();
    let g_row = Array2::from_shape_fn((rows, cols), |(r, c)| {
        derivative(rows, r, |i| image[[i, c]] as f64)
    });
    let g_col = Array2::from_shape_fn((rows, cols), |(r, c)| {
        derivative(cols, c, |j| image[[r, j]] as f64)
    });
    (g_row, g_col)
}

/// Sum of squared gradient magnitude over one image.
pub fn gradient_energy_2d(image: &ArrayView2<f32>) -> f64 {
    let (rows, cols) = image.dim();
    let mut energy = 0.0;
    for r in 0..rows {
        for c in 0..cols {
            let gr = derivative(rows, r, |i| image[[i, c]] as f64);
            let gc = derivative(cols, c, |j| image[[r, j]] as f64);
            energy += gr * gr + gc * gc;
        }
    }
    energy
}

/// Gradient energy of a volume: sum of [`gradient_energy_2d`] over every
/// slice along the first axis.
///
/// Slices are evaluated in parallel; the reduction order may vary between
/// runs, which only affects the last bits of the result.
pub fn gradient_energy(volume: &ArrayView3<f32>) -> f64 {
    volume
        .axis_iter(Axis(0))
        .into_par_iter()
        .map(|slice| gradient_energy_2d(&slice))
        .sum()
}
