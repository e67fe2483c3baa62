//! Corrections applied to projection stacks before reconstruction.
//!
//! All routines take stacks indexed `[row, angle, column]` and treat each
//! angle's `(row, column)` image as one projection.

pub mod air;
pub mod edge_ramp;
pub mod flat_field;
pub mod medipix;
pub mod rings;
pub mod transform;

pub use air::{estimate_air, subtract_air};
pub use edge_ramp::apply_edge_ramp;
pub use flat_field::flat_field_log;
pub use medipix::medipix_quadrant_shift;
pub use rings::remove_residual_rings;
pub use transform::{rotate, translate};
