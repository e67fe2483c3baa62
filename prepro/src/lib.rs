//! Projection preprocessing for X-ray CT
//!
//! This crate turns raw projection stacks into reconstruction-ready data:
//!
//! - **Rotation axis** - coarse-to-fine search for the horizontal axis
//!   offset that maximises reconstruction sharpness ([`optimize_rotation_center`])
//! - **Stitching** - placement of detector tiles into a larger stack with
//!   subpixel shift refinement ([`append_tile`], [`estimate_shift`])
//! - **Corrections** - flat-field normalisation, Medipix gap fix-up, air
//!   subtraction, residual ring removal, edge ramps and rigid transforms
//!   ([`correction`])
//!
//! Reconstruction itself is delegated to a [`shared::Reconstructor`].

pub mod config;
pub mod correction;
pub mod cost;
pub mod error;
pub mod rotation_center;
pub mod search;
pub mod shift;
pub mod stitch;

pub use config::{AirConfig, PreprocessConfig, RotationSearchConfig, ShiftEstimatorConfig};
pub use cost::reconstruction_cost;
pub use error::PreprocessError;
pub use rotation_center::optimize_rotation_center;
pub use search::subsampled_search;
pub use shift::{estimate_shift, ShiftEstimate};
pub use stitch::{append_tile, nominal_offset};
