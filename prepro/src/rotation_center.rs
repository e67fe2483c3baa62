//! Coarse-to-fine search for the rotation-axis offset.
//!
//! Each level reconstructs a handful of trial axis positions around the
//! current guess with the projections downsampled horizontally by the
//! current subscale, keeps the sharpest one (refined by a parabola), then
//! halves the subscale and narrows the window. The window half-width is one
//! object-plane pixel times the subscale, so a search started at subscale
//! `2^k` covers offsets up to `2^k` pixels.

use crate::config::RotationSearchConfig;
use crate::search::subsampled_search;
use crate::PreprocessError;
use ndarray::ArrayView3;
use shared::image_proc::centre_of_mass;
use shared::{Geometry, GeometryParameter, Reconstructor, Subsample};
use tomo_math::linspace;

/// Estimate the horizontal rotation-axis offset (`axs_hrz`) in mm.
///
/// # Arguments
/// * `reconstructor` - Reconstruction oracle used for every trial
/// * `projections` - Projection stack indexed `[row, angle, column]`
/// * `geometry` - Scan geometry; only `axs_hrz` is varied
/// * `guess` - Starting offset; derived from the data when `None`
/// * `subscale` - Initial horizontal subsampling, a power of two
/// * `use_centre_of_mass` - Derive a missing guess from the projections'
///   centre of mass rather than the geometry's current offset
/// * `config` - Search parameters
///
/// # Errors
/// Returns [`PreprocessError::Configuration`] before any reconstruction if
/// `subscale` is not a power of two or the configuration is unusable, and
/// propagates the first reconstruction failure.
pub fn optimize_rotation_center<R: Reconstructor + ?Sized>(
    reconstructor: &R,
    projections: &ArrayView3<f32>,
    geometry: &Geometry,
    guess: Option<f64>,
    subscale: usize,
    use_centre_of_mass: bool,
    config: &RotationSearchConfig,
) -> Result<f64, PreprocessError> {
    if !subscale.is_power_of_two() {
        return Err(PreprocessError::Configuration(format!(
            "subscale factor must be a power of two, got {subscale}"
        )));
    }
    if config.candidates == 0 {
        return Err(PreprocessError::Configuration(
            "rotation search needs at least one candidate per level".to_string(),
        ));
    }
    if config.vertical_subsample == 0 {
        return Err(PreprocessError::Configuration(
            "vertical subsampling must be at least 1".to_string(),
        ));
    }

    let mut guess = match guess {
        Some(value) => value,
        None => initial_guess(projections, geometry, use_centre_of_mass, config),
    };
    log::info!("Initial guess for the rotation axis shift is {guess:.3} mm");

    let footprint = geometry.pixel_footprint();
    let mut subscale = subscale;
    while subscale >= 1 {
        log::info!("Subscale factor {subscale}");
        let half_width = footprint * subscale as f64;
        let values = linspace(guess - half_width, guess + half_width, config.candidates);

        guess = subsampled_search(
            reconstructor,
            &values,
            projections,
            geometry,
            Subsample::new(config.vertical_subsample, subscale),
            GeometryParameter::AxisHorizontal,
        )?;
        log::info!("Current guess is {guess:.3} mm");

        subscale /= 2;
    }

    Ok(guess)
}

fn initial_guess(
    projections: &ArrayView3<f32>,
    geometry: &Geometry,
    use_centre_of_mass: bool,
    config: &RotationSearchConfig,
) -> f64 {
    if !use_centre_of_mass {
        return geometry.axs_hrz();
    }
    log::info!("Computing centre of mass...");
    match centre_of_mass(projections) {
        Some(com) => com[2] * geometry.pixel_footprint() * config.centre_of_mass_scale,
        None => {
            log::warn!("Projections carry no signal, starting from the geometry's axis offset");
            geometry.axs_hrz()
        }
    }
}
