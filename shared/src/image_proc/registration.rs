//! Subpixel translation estimation by cross-correlation.
//!
//! The integer peak of the FFT cross-correlation gives a coarse shift, which
//! is then refined by evaluating the correlation on a finer grid around the
//! peak with a matrix-multiply DFT. Only the refined neighbourhood is
//! computed, so cost stays close to that of the coarse FFT.
//!
//! Shifts follow the registration convention: if `moving(x) = reference(x - d)`
//! the returned shift is `-d`, i.e. the translation that maps `moving` back
//! onto `reference`.

use ndarray::{Array2, ArrayView2};
use rustfft::num_complex::Complex64;
use std::f64::consts::PI;
use thiserror::Error;
use tomo_math::{cross_power, fft2, fftfreq_index, ifft2, to_complex};

/// Errors from [`register_translation`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistrationError {
    #[error("image shapes differ: {reference:?} vs {moving:?}")]
    ShapeMismatch {
        reference: (usize, usize),
        moving: (usize, usize),
    },
    #[error("cannot register empty images")]
    Empty,
    #[error("image carries no signal (zero energy)")]
    NoSignal,
}

/// Result of a translation registration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Registration {
    /// Shift `(rows, cols)` that registers the moving image to the reference.
    pub shift: (f64, f64),
    /// Normalised RMS mismatch between the images after registration (0 = identical).
    pub error: f64,
}

/// Estimate the translation between two equally shaped images.
///
/// `upsample_factor` sets the subpixel resolution: the shift is accurate to
/// `1 / upsample_factor` pixels. Values of 0 or 1 return the integer peak.
pub fn register_translation(
    reference: &ArrayView2<f64>,
    moving: &ArrayView2<f64>,
    upsample_factor: usize,
) -> Result<Registration, RegistrationError> {
    if reference.dim() != moving.dim() {
        return Err(RegistrationError::ShapeMismatch {
            reference: reference.dim(),
            moving: moving.dim(),
        });
    }
    if reference.is_empty() {
        return Err(RegistrationError::Empty);
    }

    let reference_energy: f64 = reference.iter().map(|v| v * v).sum();
    let moving_energy: f64 = moving.iter().map(|v| v * v).sum();
    if reference_energy <= 0.0 || moving_energy <= 0.0 {
        return Err(RegistrationError::NoSignal);
    }

    let (rows, cols) = reference.dim();
    let product = cross_power(&fft2(&to_complex(reference)), &fft2(&to_complex(moving)))
        .map_err(|_| RegistrationError::ShapeMismatch {
            reference: reference.dim(),
            moving: moving.dim(),
        })?;
    let correlation = ifft2(&product);

    let (peak, mut peak_value) = argmax_norm(&correlation);
    let mut shift = (
        wrap_shift(peak.0, rows) as f64,
        wrap_shift(peak.1, cols) as f64,
    );

    if upsample_factor > 1 {
        let up = upsample_factor as f64;
        let region = (up * 1.5).ceil() as usize;
        let centre = (region / 2) as f64;
        let offset = (centre - shift.0 * up, centre - shift.1 * up);

        let refined = upsampled_dft(&product, region, upsample_factor, offset);
        let (fine_peak, fine_value) = argmax_norm(&refined);

        shift.0 += (fine_peak.0 as f64 - centre) / up;
        shift.1 += (fine_peak.1 as f64 - centre) / up;
        peak_value = fine_value / (rows * cols) as f64;
    }

    let error = (1.0 - peak_value * peak_value / (reference_energy * moving_energy))
        .abs()
        .sqrt();

    Ok(Registration { shift, error })
}

/// Map an FFT peak index into the signed range `(-n/2, n/2]`.
fn wrap_shift(index: usize, n: usize) -> isize {
    if index > n / 2 {
        index as isize - n as isize
    } else {
        index as isize
    }
}

/// Index and magnitude of the largest-magnitude element (first on ties).
fn argmax_norm(data: &Array2<Complex64>) -> ((usize, usize), f64) {
    let mut best = ((0, 0), f64::NEG_INFINITY);
    for ((r, c), value) in data.indexed_iter() {
        let norm = value.norm();
        if norm > best.1 {
            best = ((r, c), norm);
        }
    }
    best
}

/// Evaluate the inverse DFT of `spectrum` on a `region x region` grid
/// sampled at `1 / upsample` pixel spacing, with grid point `(0, 0)` placed at
/// `-offset / upsample` pixels.
///
/// The sum is separable: columns are contracted first, then rows.
fn upsampled_dft(
    spectrum: &Array2<Complex64>,
    region: usize,
    upsample: usize,
    offset: (f64, f64),
) -> Array2<Complex64> {
    let (rows, cols) = spectrum.dim();

    let kernel = |n: usize, off: f64| -> Array2<Complex64> {
        let scale = 2.0 * PI / (n * upsample) as f64;
        Array2::from_shape_fn((n, region), |(k, u)| {
            let phase = scale * fftfreq_index(k, n) * (u as f64 - off);
            Complex64::from_polar(1.0, phase)
        })
    };
    let row_kernel = kernel(rows, offset.0);
    let col_kernel = kernel(cols, offset.1);

    // partial[k, v] = sum_l spectrum[k, l] * col_kernel[l, v]
    let mut partial = Array2::<Complex64>::zeros((rows, region));
    for k in 0..rows {
        for l in 0..cols {
            let s = spectrum[[k, l]];
            for v in 0..region {
                partial[[k, v]] += s * col_kernel[[l, v]];
            }
        }
    }

    let mut out = Array2::<Complex64>::zeros((region, region));
    for u in 0..region {
        for k in 0..rows {
            let w = row_kernel[[k, u]];
            for v in 0..region {
                out[[u, v]] += w * partial[[k, v]];
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Smooth test image with a single off-centre blob.
    fn blob(rows: usize, cols: usize, centre: (f64, f64), sigma: f64) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |(r, c)| {
            let dr = r as f64 - centre.0;
            let dc = c as f64 - centre.1;
            (-(dr * dr + dc * dc) / (2.0 * sigma * sigma)).exp()
        })
    }

    #[test]
    fn test_identical_images_have_zero_shift() {
        let image = blob(32, 32, (12.0, 17.0), 3.0);
        let result = register_translation(&image.view(), &image.view(), 10).unwrap();

        assert_abs_diff_eq!(result.shift.0, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.shift.1, 0.0, epsilon = 1e-9);
        assert!(result.error < 1e-6);
    }

    #[test]
    fn test_integer_shift_sign_convention() {
        let reference = blob(32, 40, (14.0, 20.0), 2.5);
        // moving = reference shifted by (+3, -5)
        let moving = blob(32, 40, (17.0, 15.0), 2.5);
        let result = register_translation(&reference.view(), &moving.view(), 1).unwrap();

        assert_eq!(result.shift, (-3.0, 5.0));
    }

    #[test]
    fn test_subpixel_shift() {
        let reference = blob(48, 48, (20.0, 24.0), 3.0);
        let moving = blob(48, 48, (21.3, 22.6), 3.0);
        let result = register_translation(&reference.view(), &moving.view(), 10).unwrap();

        assert_abs_diff_eq!(result.shift.0, -1.3, epsilon = 0.11);
        assert_abs_diff_eq!(result.shift.1, 1.4, epsilon = 0.11);
    }

    #[test]
    fn test_rejects_mismatched_and_empty() {
        let a = Array2::<f64>::ones((4, 4));
        let b = Array2::<f64>::ones((4, 5));
        assert!(matches!(
            register_translation(&a.view(), &b.view(), 10),
            Err(RegistrationError::ShapeMismatch { .. })
        ));

        let empty = Array2::<f64>::zeros((0, 3));
        assert_eq!(
            register_translation(&empty.view(), &empty.view(), 10),
            Err(RegistrationError::Empty)
        );
    }

    #[test]
    fn test_zero_image_has_no_signal() {
        let a = Array2::<f64>::zeros((8, 8));
        let b = blob(8, 8, (4.0, 4.0), 1.0);
        assert_eq!(
            register_translation(&a.view(), &b.view(), 10),
            Err(RegistrationError::NoSignal)
        );
    }

    #[test]
    fn test_wrap_shift() {
        assert_eq!(wrap_shift(0, 8), 0);
        assert_eq!(wrap_shift(4, 8), 4);
        assert_eq!(wrap_shift(5, 8), -3);
        assert_eq!(wrap_shift(3, 7), 3);
        assert_eq!(wrap_shift(4, 7), -3);
    }
}
