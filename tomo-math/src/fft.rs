//! 2D discrete Fourier transforms over `ndarray` arrays.
//!
//! Thin wrappers around `rustfft` applying row-column decomposition. Results
//! are kept in the natural FFT order (zero frequency at index 0); use
//! [`fftfreq_index`] to map an index to its signed frequency.

use ndarray::{Array2, ArrayView2, Axis};
use rustfft::num_complex::Complex64;
use rustfft::{FftDirection, FftPlanner};
use thiserror::Error;

/// Errors from element-wise operations on spectra.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FftError {
    #[error("spectrum shapes differ: {left:?} vs {right:?}")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
}

/// Signed frequency index of FFT bin `k` for a transform of length `n`.
///
/// Follows the `fftfreq` ordering: `[0, 1, ..., ceil(n/2)-1, -floor(n/2), ..., -1]`.
pub fn fftfreq_index(k: usize, n: usize) -> f64 {
    if k <= (n - 1) / 2 {
        k as f64
    } else {
        k as f64 - n as f64
    }
}

/// Promote a real image to complex.
pub fn to_complex(image: &ArrayView2<f64>) -> Array2<Complex64> {
    image.mapv(|v| Complex64::new(v, 0.0))
}

fn transform_2d(data: &mut Array2<Complex64>, direction: FftDirection) {
    let (rows, cols) = data.dim();
    if rows == 0 || cols == 0 {
        return;
    }

    let mut planner = FftPlanner::<f64>::new();
    let row_fft = planner.plan_fft(cols, direction);
    let col_fft = planner.plan_fft(rows, direction);
    let mut buffer: Vec<Complex64> = Vec::with_capacity(rows.max(cols));

    for (axis, fft) in [(Axis(1), &row_fft), (Axis(0), &col_fft)] {
        for mut lane in data.lanes_mut(axis) {
            buffer.clear();
            buffer.extend(lane.iter().copied());
            fft.process(&mut buffer);
            lane.iter_mut()
                .zip(buffer.iter())
                .for_each(|(dst, src)| *dst = *src);
        }
    }
}

/// Forward 2D FFT (unnormalised).
pub fn fft2(data: &Array2<Complex64>) -> Array2<Complex64> {
    let mut out = data.clone();
    transform_2d(&mut out, FftDirection::Forward);
    out
}

/// Inverse 2D FFT, normalised by `1 / (rows * cols)`.
pub fn ifft2(data: &Array2<Complex64>) -> Array2<Complex64> {
    let mut out = data.clone();
    transform_2d(&mut out, FftDirection::Inverse);
    let n = out.len();
    if n > 0 {
        let norm = 1.0 / n as f64;
        out.mapv_inplace(|c| c * norm);
    }
    out
}

/// Element-wise product `a * conj(b)` of two spectra.
pub fn cross_power(
    a: &Array2<Complex64>,
    b: &Array2<Complex64>,
) -> Result<Array2<Complex64>, FftError> {
    if a.dim() != b.dim() {
        return Err(FftError::ShapeMismatch {
            left: a.dim(),
            right: b.dim(),
        });
    }
    Ok(ndarray::Zip::from(a)
        .and(b)
        .map_collect(|&x, &y| x * y.conj()))
}
