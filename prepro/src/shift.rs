//! Subpixel shift estimation between overlapping projection stacks.
//!
//! A sparse set of slices is registered pairwise. Each pair is reduced to
//! the pixels where both stacks carry signal, edge-filtered with a
//! Laplacian (robust against clipped intensities) and cross-correlated. The
//! per-slice shifts are averaged and only trusted when they agree.

use crate::config::ShiftEstimatorConfig;
use crate::PreprocessError;
use ndarray::{Array2, ArrayView2, ArrayView3, Axis, Zip};
use shared::algo::slice_along;
use shared::image_proc::{laplace, register_translation, RegistrationError};
use tomo_math::{mean, std_dev};

/// Aggregated shift between a reference and a candidate stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftEstimate {
    /// Shift `(vertical, horizontal)` in pixels to apply to the candidate.
    /// Zero when the estimate is unreliable.
    pub shift: (f64, f64),
    /// Population standard deviation of the per-slice shifts
    pub std: (f64, f64),
    /// Whether the mean passed the consistency check
    pub reliable: bool,
    /// Number of slices that contributed a measurement
    pub samples: usize,
}

impl ShiftEstimate {
    fn unreliable(std: (f64, f64), samples: usize) -> Self {
        Self {
            shift: (0.0, 0.0),
            std,
            reliable: false,
            samples,
        }
    }
}

/// Estimate the residual shift of `candidate` relative to `reference`.
///
/// `nominal_offset` is the expected position of the candidate's origin in
/// the reference, in pixels along the two axes other than `sample_dim`.
/// Slices are taken every `config.slice_stride` along `sample_dim`.
///
/// The mean shift is accepted only when, on each axis, its magnitude is
/// strictly greater than `config.reliability_factor` times the spread of the
/// per-slice values. A zero mean therefore never passes. Otherwise, or when
/// no slice overlaps, a zero shift flagged unreliable is returned.
pub fn estimate_shift(
    reference: &ArrayView3<f32>,
    candidate: &ArrayView3<f32>,
    nominal_offset: (isize, isize),
    sample_dim: usize,
    config: &ShiftEstimatorConfig,
) -> Result<ShiftEstimate, PreprocessError> {
    if sample_dim > 2 {
        return Err(PreprocessError::Configuration(format!(
            "sampling axis must be 0, 1 or 2, got {sample_dim}"
        )));
    }
    if config.slice_stride == 0 {
        return Err(PreprocessError::Configuration(
            "slice stride must be at least 1".to_string(),
        ));
    }
    let length = candidate.len_of(Axis(sample_dim));
    if reference.len_of(Axis(sample_dim)) != length {
        return Err(PreprocessError::DimensionMismatch(format!(
            "reference has {} slices along axis {sample_dim}, candidate has {length}",
            reference.len_of(Axis(sample_dim))
        )));
    }

    let mut vertical = Vec::new();
    let mut horizontal = Vec::new();
    for index in (0..length).step_by(config.slice_stride) {
        let ref_slice = slice_along(reference, index, sample_dim)?;
        let cand_slice = slice_along(candidate, index, sample_dim)?;

        let Some((ref_region, cand_region)) = overlap(&ref_slice, &cand_slice, nominal_offset)
        else {
            log::debug!("Slice {index}: no overlap with the reference");
            continue;
        };

        match register_translation(
            &laplace(&ref_region.view()).view(),
            &laplace(&cand_region.view()).view(),
            config.upsample_factor,
        ) {
            Ok(registration) => {
                log::debug!(
                    "Slice {index}: shift ({:.2}, {:.2}), error {:.3}",
                    registration.shift.0,
                    registration.shift.1,
                    registration.error
                );
                vertical.push(registration.shift.0);
                horizontal.push(registration.shift.1);
            }
            Err(RegistrationError::NoSignal) => {
                log::debug!("Slice {index}: no edges in the common area");
            }
            Err(e) => return Err(e.into()),
        }
    }

    if vertical.is_empty() {
        log::warn!("No overlapping slices found, shift correction is not applied");
        return Ok(ShiftEstimate::unreliable((0.0, 0.0), 0));
    }

    let shift = (mean(&vertical)?, mean(&horizontal)?);
    let std = (std_dev(&vertical)?, std_dev(&horizontal)?);
    let samples = vertical.len();

    let consistent = |m: f64, s: f64| m.abs() > config.reliability_factor * s;
    if consistent(shift.0, std.0) && consistent(shift.1, std.1) {
        log::info!(
            "Found shift ({:.2}, {:.2}) with STD ({:.2}, {:.2}) over {samples} slices",
            shift.0,
            shift.1,
            std.0,
            std.1
        );
        Ok(ShiftEstimate {
            shift,
            std,
            reliable: true,
            samples,
        })
    } else {
        log::warn!(
            "Found shift ({:.2}, {:.2}) with STD ({:.2}, {:.2}): STD too high, automatic shift correction is not applied",
            shift.0,
            shift.1,
            std.0,
            std.1
        );
        Ok(ShiftEstimate::unreliable(std, samples))
    }
}

/// Clip a signed window `[offset, offset + len)` against `[0, limit)`.
///
/// Returns the range in reference coordinates and the matching start in
/// candidate coordinates.
fn clip_window(offset: isize, len: usize, limit: usize) -> Option<(usize, usize, usize)> {
    let start = offset.max(0);
    let end = (offset + len as isize).min(limit as isize);
    if end <= start {
        return None;
    }
    Some((start as usize, end as usize, (start - offset) as usize))
}

/// Common signal area of a reference slice and a candidate slice placed at
/// `offset`.
///
/// Both regions are zeroed outside the pixels where both are non-zero, then
/// reduced to the rows and columns that contain any such pixel.
fn overlap(
    reference: &ArrayView2<f32>,
    candidate: &ArrayView2<f32>,
    offset: (isize, isize),
) -> Option<(Array2<f64>, Array2<f64>)> {
    let (cand_rows, cand_cols) = candidate.dim();
    let (r0, r1, cr) = clip_window(offset.0, cand_rows, reference.nrows())?;
    let (c0, c1, cc) = clip_window(offset.1, cand_cols, reference.ncols())?;
    let (h, w) = (r1 - r0, c1 - c0);

    let ref_window = reference.slice(ndarray::s![r0..r1, c0..c1]);
    let cand_window = candidate.slice(ndarray::s![cr..cr + h, cc..cc + w]);

    let mask = Zip::from(&ref_window)
        .and(&cand_window)
        .map_collect(|&a, &b| a * b != 0.0);

    let rows: Vec<usize> = (0..h).filter(|&r| mask.row(r).iter().any(|&m| m)).collect();
    let cols: Vec<usize> = (0..w)
        .filter(|&c| mask.column(c).iter().any(|&m| m))
        .collect();
    if rows.is_empty() {
        return None;
    }

    let masked = |window: &ArrayView2<f32>| {
        Zip::from(window)
            .and(&mask)
            .map_collect(|&v, &m| if m { v as f64 } else { 0.0 })
            .select(Axis(0), &rows)
            .select(Axis(1), &cols)
    };
    Some((masked(&ref_window), masked(&cand_window)))
}
