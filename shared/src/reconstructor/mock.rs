use super::{ReconstructionError, Reconstructor, Subsample};
use crate::geometry::Geometry;
use ndarray::{s, Array3, ArrayView3};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Stand-in reconstruction backend with a known best-focus axis offset.
///
/// Returns a fixed reference volume, subsampled by the requested factors and
/// attenuated by a defocus response `1 / sqrt(1 + (Δ / width)^2)` where
/// `Δ = geometry.axs_hrz() - true_axis`. Gradient energy of the output is
/// therefore maximal exactly at `true_axis` and falls off smoothly on both
/// sides, which is what a real backend shows near the correct axis.
/// Projection data is only checked for being non-empty.
pub struct MockReconstructor {
    volume: Array3<f32>,
    true_axis: f64,
    defocus_width: f64,
    fail_after: Option<usize>,
    calls: AtomicUsize,
}

impl MockReconstructor {
    pub fn new(volume: Array3<f32>, true_axis: f64) -> Self {
        Self {
            volume,
            true_axis,
            defocus_width: 1.0,
            fail_after: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Width (mm) of the defocus response.
    pub fn with_defocus_width(mut self, width: f64) -> Self {
        self.defocus_width = width;
        self
    }

    /// Fail every call after the first `calls` succeed.
    pub fn with_failure_after(mut self, calls: usize) -> Self {
        self.fail_after = Some(calls);
        self
    }

    /// Number of reconstructions requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn true_axis(&self) -> f64 {
        self.true_axis
    }

    /// Amplitude applied to the reference volume for a given axis offset.
    pub fn response(&self, axis: f64) -> f64 {
        let delta = (axis - self.true_axis) / self.defocus_width;
        1.0 / (1.0 + delta * delta).sqrt()
    }
}

impl Reconstructor for MockReconstructor {
    fn reconstruct(
        &self,
        projections: ArrayView3<f32>,
        geometry: &Geometry,
        subsample: Subsample,
    ) -> Result<Array3<f32>, ReconstructionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = self.fail_after {
            if call >= limit {
                return Err(ReconstructionError::Failed(format!(
                    "mock backend configured to fail after {limit} calls"
                )));
            }
        }
        if !subsample.is_valid() {
            return Err(ReconstructionError::InvalidSubsample(subsample));
        }
        if projections.is_empty() {
            return Err(ReconstructionError::InvalidProjections(
                "projection stack is empty".to_string(),
            ));
        }

        let amplitude = self.response(geometry.axs_hrz()) as f32;
        log::trace!(
            "Mock reconstruction #{call} at axis {:.4} ({subsample}): amplitude {amplitude:.4}",
            geometry.axs_hrz()
        );
        let v = subsample.vertical as isize;
        let h = subsample.horizontal as isize;
        Ok(self
            .volume
            .slice(s![..;v, ..;h, ..;h])
            .mapv(|value| value * amplitude))
    }
}
