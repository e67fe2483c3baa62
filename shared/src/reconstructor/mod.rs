//! Reconstruction oracle abstraction.
//!
//! The axis search treats volume reconstruction as an external collaborator:
//! any backend (FDK on a GPU, an iterative solver, or the mock used in tests)
//! implements [`Reconstructor`] and is handed to the search by reference.

pub mod mock;

use crate::geometry::Geometry;
use ndarray::{Array3, ArrayView3};
use std::fmt;
use thiserror::Error;

pub use mock::MockReconstructor;

/// Error type for reconstruction backends
#[derive(Error, Debug)]
pub enum ReconstructionError {
    /// Backend-specific failure
    #[error("reconstruction failed: {0}")]
    Failed(String),
    /// Subsampling factors the backend cannot honour
    #[error("invalid subsampling {0}")]
    InvalidSubsample(Subsample),
    /// Projection data the backend cannot use
    #[error("invalid projection data: {0}")]
    InvalidProjections(String),
}

/// Integer downsampling factors applied before reconstruction.
///
/// `vertical` applies to detector rows, `horizontal` to detector columns and
/// projection angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subsample {
    pub vertical: usize,
    pub horizontal: usize,
}

impl Subsample {
    pub fn new(vertical: usize, horizontal: usize) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }

    /// No downsampling.
    pub fn full() -> Self {
        Self::new(1, 1)
    }

    /// Both factors are at least one.
    pub fn is_valid(&self) -> bool {
        self.vertical >= 1 && self.horizontal >= 1
    }
}

impl fmt::Display for Subsample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.vertical, self.horizontal)
    }
}

/// Trait for volume reconstruction backends
///
/// Implementations must behave as a pure function of their inputs: the same
/// projections, geometry and subsampling yield the same volume. They may be
/// expensive; callers do not cache results.
pub trait Reconstructor {
    /// Reconstruct a volume indexed `[slice, row, column]`.
    ///
    /// # Arguments
    /// * `projections` - Projection stack indexed `[row, angle, column]`
    /// * `geometry` - Scan geometry to reconstruct with
    /// * `subsample` - Downsampling factors to apply before reconstruction
    fn reconstruct(
        &self,
        projections: ArrayView3<f32>,
        geometry: &Geometry,
        subsample: Subsample,
    ) -> Result<Array3<f32>, ReconstructionError>;
}

impl<T: Reconstructor + ?Sized> Reconstructor for &T {
    fn reconstruct(
        &self,
        projections: ArrayView3<f32>,
        geometry: &Geometry,
        subsample: Subsample,
    ) -> Result<Array3<f32>, ReconstructionError> {
        (**self).reconstruct(projections, geometry, subsample)
    }
}
