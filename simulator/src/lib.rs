//! X-ray CT simulation
//!
//! This crate generates synthetic data for exercising the preprocessing
//! pipeline: analytic phantom volumes, detector contrast transfer functions
//! (blur and phase contrast), counting and Gaussian noise, and a
//! parallel-beam forward projector producing `[row, angle, column]` stacks.

pub mod ctf;
pub mod noise;
pub mod phantom;
pub mod projector;

use thiserror::Error;

pub use ctf::{apply_ctf, apply_ctf_stack, ctf, CtfModel};
pub use noise::{apply_noise, apply_noise_stack, NoiseModel};
pub use phantom::{phantom, Phantom};
pub use projector::parallel_project;

/// Errors from simulation routines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("invalid phantom: {0}")]
    InvalidPhantom(String),
    #[error("invalid CTF model: {0}")]
    InvalidCtf(String),
    #[error("CTF shape {ctf:?} does not match image shape {image:?}")]
    CtfShapeMismatch {
        ctf: (usize, usize),
        image: (usize, usize),
    },
    #[error("invalid noise model: {0}")]
    InvalidNoise(String),
    #[error("invalid projection request: {0}")]
    InvalidProjection(String),
}
