//! Array-level algorithms shared by the preprocessing and simulation crates
//!
//! This module provides axis-generic helpers for 3D stacks (slicing, padding,
//! cropping, binning) and the parallel per-chunk / per-slice drivers.

pub mod array_ops;
pub mod parallel;

pub use array_ops::{
    bin_axis, crop_axis, multiply_along, pad_axis, pad_image, slice_along, ArrayError,
};
pub use parallel::{map_slices_in_parallel, process_array_in_parallel_chunks};
