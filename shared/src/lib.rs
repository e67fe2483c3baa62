//! Shared components for the tomography preprocessing crates.
//!
//! This crate contains the acquisition geometry, the reconstruction oracle
//! interface and the image-processing kernels used by both the simulator and
//! the preprocessing pipeline.

pub mod algo;
pub mod geometry;
pub mod image_proc;
pub mod reconstructor;

pub use geometry::{Geometry, GeometryError, GeometryParameter};
pub use reconstructor::{MockReconstructor, ReconstructionError, Reconstructor, Subsample};
