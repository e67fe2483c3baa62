//! tomo-math - Numerical building blocks for tomography preprocessing
//!
//! This crate provides the small numerical kernels shared by the
//! preprocessing and simulation crates:
//!
//! - **Parabolic** - three-point parabolic refinement of a sampled minimum
//! - **Statistics** - mean, population standard deviation, median, histogram
//! - **FFT** - 2D forward/inverse transforms over `ndarray` arrays
//!
//! # Example
//!
//! ```text
//! use tomo_math::{linspace, parabolic_minimum};
//!
//! let space = linspace(-1.0, 1.0, 5);
//! let values: Vec<f64> = space.iter().map(|x| (x - 0.3).powi(2)).collect();
//! let x0 = parabolic_minimum(&values, 3, &space)?;
//! ```

pub mod fft;
pub mod parabolic;
pub mod stats;

// Re-export commonly used types
pub use fft::{cross_power, fft2, fftfreq_index, ifft2, to_complex, FftError};
pub use parabolic::{parabolic_minimum, ParabolicError};
pub use stats::{histogram, linspace, mean, median, std_dev, StatsError};
