//! Detector noise models.
//!
//! Noise is generated in row chunks with per-chunk seeded RNGs, so a given
//! seed reproduces the same output regardless of thread count.

use crate::SimulationError;
use ndarray::{Array2, Array3};
use rand::Rng;
use rand_distr::{Distribution, Poisson, StandardNormal};
use shared::algo::process_array_in_parallel_chunks;

/// Noise models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoiseModel {
    /// Photon counting: each pixel becomes a Poisson draw with mean
    /// `value * scale`. The output is in counts (not rescaled).
    Poisson { scale: f64 },
    /// Additive Gaussian noise with the given standard deviation.
    Normal { std_dev: f64 },
}

impl NoiseModel {
    fn validate(&self) -> Result<(), SimulationError> {
        let (name, value) = match *self {
            NoiseModel::Poisson { scale } => ("scale", scale),
            NoiseModel::Normal { std_dev } => ("standard deviation", std_dev),
        };
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(SimulationError::InvalidNoise(format!(
                "{name} must be non-negative, got {value}"
            )))
        }
    }

    fn sample<R: Rng + ?Sized>(&self, value: f32, rng: &mut R) -> f32 {
        match *self {
            NoiseModel::Poisson { scale } => {
                let lambda = value as f64 * scale;
                // Poisson with non-positive mean is identically zero
                match Poisson::new(lambda) {
                    Ok(dist) if lambda > 0.0 => dist.sample(rng) as f32,
                    _ => 0.0,
                }
            }
            NoiseModel::Normal { std_dev } => {
                let z: f64 = StandardNormal.sample(rng);
                (value as f64 + std_dev * z) as f32
            }
        }
    }
}

/// Apply noise to an image.
///
/// # Arguments
/// * `image` - Noise-free image (consumed and returned)
/// * `model` - Noise model
/// * `seed` - Base seed for the per-chunk generators
pub fn apply_noise(
    image: Array2<f32>,
    model: NoiseModel,
    seed: u64,
) -> Result<Array2<f32>, SimulationError> {
    model.validate()?;
    Ok(process_array_in_parallel_chunks(
        image,
        seed,
        Some(64),
        |chunk, rng| {
            chunk
                .iter_mut()
                .for_each(|pixel| *pixel = model.sample(*pixel, rng));
        },
    ))
}

/// Apply noise to a 3D stack, treating it as one tall image.
pub fn apply_noise_stack(
    stack: Array3<f32>,
    model: NoiseModel,
    seed: u64,
) -> Result<Array3<f32>, SimulationError> {
    let (d0, d1, d2) = stack.dim();
    let flat = Array2::from_shape_vec((d0 * d1, d2), stack.into_iter().collect())
        .map_err(|e| SimulationError::InvalidNoise(e.to_string()))?;
    let noisy = apply_noise(flat, model, seed)?;
    Array3::from_shape_vec((d0, d1, d2), noisy.into_iter().collect())
        .map_err(|e| SimulationError::InvalidNoise(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_poisson_mean_and_variance() {
        let image = Array2::<f32>::from_elem((200, 200), 5.0);
        let noisy = apply_noise(image, NoiseModel::Poisson { scale: 2.0 }, 7).unwrap();

        let n = noisy.len() as f64;
        let mean = noisy.iter().map(|&v| v as f64).sum::<f64>() / n;
        let var = noisy.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n;

        assert_relative_eq!(mean, 10.0, max_relative = 0.02);
        assert_relative_eq!(var, 10.0, max_relative = 0.05);
        assert!(noisy.iter().all(|&v| v >= 0.0 && v.fract() == 0.0));
    }

    #[test]
    fn test_normal_statistics() {
        let image = Array2::<f32>::from_elem((200, 200), 1.0);
        let noisy = apply_noise(image, NoiseModel::Normal { std_dev: 0.5 }, 11).unwrap();

        let n = noisy.len() as f64;
        let mean = noisy.iter().map(|&v| v as f64).sum::<f64>() / n;
        let var = noisy.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n;

        assert!((mean - 1.0).abs() < 0.01);
        assert_relative_eq!(var.sqrt(), 0.5, max_relative = 0.02);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let image = Array2::<f32>::from_elem((130, 9), 3.0);
        let a = apply_noise(image.clone(), NoiseModel::Poisson { scale: 1.0 }, 42).unwrap();
        let b = apply_noise(image.clone(), NoiseModel::Poisson { scale: 1.0 }, 42).unwrap();
        let c = apply_noise(image, NoiseModel::Poisson { scale: 1.0 }, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_zero_and_negative_means_stay_zero() {
        let image = Array2::from_shape_fn((4, 4), |(r, _)| -(r as f32));
        let noisy = apply_noise(image, NoiseModel::Poisson { scale: 1.0 }, 1).unwrap();
        assert!(noisy.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_stack_keeps_shape_and_rejects_bad_model() {
        let stack = Array3::<f32>::from_elem((3, 4, 5), 2.0);
        let noisy = apply_noise_stack(stack.clone(), NoiseModel::Normal { std_dev: 0.1 }, 3).unwrap();
        assert_eq!(noisy.dim(), (3, 4, 5));

        assert!(apply_noise_stack(stack, NoiseModel::Normal { std_dev: -1.0 }, 3).is_err());
    }
}
