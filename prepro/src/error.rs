use shared::algo::ArrayError;
use shared::image_proc::RegistrationError;
use shared::{GeometryError, ReconstructionError};
use thiserror::Error;
use tomo_math::{ParabolicError, StatsError};

/// Errors from the preprocessing pipeline.
#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("reconstruction failed: {0}")]
    Reconstruction(#[from] ReconstructionError),
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),
    #[error("array error: {0}")]
    Array(#[from] ArrayError),
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),
    #[error("statistics error: {0}")]
    Statistics(#[from] StatsError),
    #[error("parabolic refinement failed: {0}")]
    Parabolic(#[from] ParabolicError),
}
