//! Detector contrast transfer functions.
//!
//! A CTF is the Fourier transform of the system point spread function. All
//! CTFs here are returned in natural FFT order (zero frequency at `[0, 0]`)
//! so they multiply `fft2` output directly.
//!
//! Angular spatial frequencies are `w = 2π k / (n · pixel)` with `k` the
//! signed FFT index, so lengths and pixel sizes share one unit (mm).

use crate::SimulationError;
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis};
use rustfft::num_complex::Complex64;
use tomo_math::{fft2, fftfreq_index, ifft2};

/// Reduced Planck constant in eV·s.
const HBAR_EV_S: f64 = 6.582_119_569e-16;
/// Speed of light in mm/s.
const SPEED_OF_LIGHT_MM_S: f64 = 2.997_924_58e11;

/// Transfer function models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CtfModel {
    /// Gaussian blur with standard deviation `sigma` (mm).
    Gaussian { pixel: f64, sigma: f64 },
    /// Linearised dual phase/amplitude contrast propagator.
    ///
    /// `alpha` weights the absorption term against the phase term.
    DualCtf {
        pixel: f64,
        energy_kev: f64,
        src2obj: f64,
        det2obj: f64,
        alpha: f64,
    },
    /// Fresnel free-space propagator.
    Fresnel {
        pixel: f64,
        energy_kev: f64,
        src2obj: f64,
        det2obj: f64,
    },
}

fn require_positive(name: &str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidCtf(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

/// Angular frequency of FFT bin `k` along an axis of `n` pixels.
fn angular_frequency(k: usize, n: usize, pixel: f64) -> f64 {
    2.0 * std::f64::consts::PI * fftfreq_index(k, n) / (n as f64 * pixel)
}

/// Photon wavenumber in 1/mm for an energy in keV.
fn wavenumber(energy_kev: f64) -> f64 {
    energy_kev * 1e3 / (HBAR_EV_S * SPEED_OF_LIGHT_MM_S)
}

/// Effective propagation distance `det2obj / M` of a cone-beam setup.
fn effective_distance(src2obj: f64, det2obj: f64) -> f64 {
    let magnification = (src2obj + det2obj) / src2obj;
    det2obj / magnification
}

/// Map each frequency `(u, v)` of a `rows x cols` grid through `f`.
fn frequency_map(
    shape: (usize, usize),
    pixel: f64,
    f: impl Fn(f64, f64) -> Complex64,
) -> Array2<Complex64> {
    let (rows, cols) = shape;
    Array2::from_shape_fn(shape, |(r, c)| {
        f(
            angular_frequency(r, rows, pixel),
            angular_frequency(c, cols, pixel),
        )
    })
}

/// Build a CTF for images of the given `(rows, cols)` shape.
pub fn ctf(shape: (usize, usize), model: CtfModel) -> Result<Array2<Complex64>, SimulationError> {
    match model {
        CtfModel::Gaussian { pixel, sigma } => {
            require_positive("pixel", pixel)?;
            if !(sigma.is_finite() && sigma >= 0.0) {
                return Err(SimulationError::InvalidCtf(format!(
                    "sigma must be non-negative, got {sigma}"
                )));
            }
            Ok(frequency_map(shape, pixel, |u, v| {
                let s = -((u * sigma).powi(2) + (v * sigma).powi(2)) / 2.0;
                Complex64::new(s.exp(), 0.0)
            }))
        }
        CtfModel::DualCtf {
            pixel,
            energy_kev,
            src2obj,
            det2obj,
            alpha,
        } => {
            require_positive("pixel", pixel)?;
            require_positive("energy", energy_kev)?;
            require_positive("src2obj", src2obj)?;
            require_positive("det2obj", det2obj)?;
            let k = wavenumber(energy_kev);
            let r_eff = effective_distance(src2obj, det2obj);
            Ok(frequency_map(shape, pixel, |u, v| {
                let phase = (u * u + v * v) * r_eff / (2.0 * k);
                Complex64::new(-2.0 * phase.cos() + 2.0 * alpha * phase.sin(), 0.0)
            }))
        }
        CtfModel::Fresnel {
            pixel,
            energy_kev,
            src2obj,
            det2obj,
        } => {
            require_positive("pixel", pixel)?;
            require_positive("energy", energy_kev)?;
            require_positive("src2obj", src2obj)?;
            require_positive("det2obj", det2obj)?;
            let k = wavenumber(energy_kev);
            let r_eff = effective_distance(src2obj, det2obj);
            Ok(frequency_map(shape, pixel, |u, v| {
                Complex64::from_polar(1.0, (u * u + v * v) * r_eff / (2.0 * k))
            }))
        }
    }
}

/// Convolve an image with a CTF, returning the real part of the result.
pub fn apply_ctf(
    image: &ArrayView2<f32>,
    ctf: &Array2<Complex64>,
) -> Result<Array2<f32>, SimulationError> {
    if image.dim() != ctf.dim() {
        return Err(SimulationError::CtfShapeMismatch {
            ctf: ctf.dim(),
            image: image.dim(),
        });
    }
    let spectrum = fft2(&image.mapv(|v| Complex64::new(v as f64, 0.0))) * ctf;
    Ok(ifft2(&spectrum).mapv(|c| c.re as f32))
}

/// Apply a CTF to every projection of a `[row, angle, column]` stack.
pub fn apply_ctf_stack(
    stack: &ArrayView3<f32>,
    ctf: &Array2<Complex64>,
) -> Result<Array3<f32>, SimulationError> {
    let mut out = Array3::<f32>::zeros(stack.raw_dim());
    for (projection, mut target) in stack
        .axis_iter(Axis(1))
        .zip(out.axis_iter_mut(Axis(1)))
    {
        target.assign(&apply_ctf(&projection, ctf)?);
    }
    Ok(out)
}
