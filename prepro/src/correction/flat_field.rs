//! Dark and flat-field normalisation.

use ndarray::{Array3, ArrayView2, ArrayView3, Axis, Zip};
use rayon::prelude::*;

use crate::PreprocessError;

/// Smallest transmission passed to the logarithm.
pub const TRANSMISSION_FLOOR: f32 = 1e-6;

/// Convert raw projections to line integrals in place.
///
/// Each projection becomes `-ln((proj - dark) / (mean(flats) - dark))`.
/// `dark` is one `(row, column)` frame and `flats` is indexed
/// `[frame, row, column]`. Detector pixels without open-beam signal are set
/// to zero; transmission is floored at [`TRANSMISSION_FLOOR`].
pub fn flat_field_log(
    projections: &mut Array3<f32>,
    dark: &ArrayView2<f32>,
    flats: &ArrayView3<f32>,
) -> Result<(), PreprocessError> {
    let (rows, _, cols) = projections.dim();
    if dark.dim() != (rows, cols) {
        return Err(PreprocessError::DimensionMismatch(format!(
            "dark frame is {:?}, projections are {rows}x{cols}",
            dark.dim()
        )));
    }
    let (_, flat_rows, flat_cols) = flats.dim();
    if (flat_rows, flat_cols) != (rows, cols) {
        return Err(PreprocessError::DimensionMismatch(format!(
            "flat fields are {flat_rows}x{flat_cols}, projections are {rows}x{cols}"
        )));
    }
    let flat = flats.mean_axis(Axis(0)).ok_or_else(|| {
        PreprocessError::DimensionMismatch("no flat-field frames".to_string())
    })?;
    let open_beam = &flat - dark;

    let dead = open_beam.iter().filter(|&&o| o <= 0.0).count();
    if dead > 0 {
        log::warn!("{dead} detector pixels have no open-beam signal, zeroing them");
    }

    projections
        .axis_iter_mut(Axis(1))
        .into_par_iter()
        .for_each(|mut projection| {
            Zip::from(&mut projection)
                .and(dark)
                .and(&open_beam)
                .for_each(|p, &d, &o| {
                    *p = if o > 0.0 {
                        -((*p - d) / o).max(TRANSMISSION_FLOOR).ln()
                    } else {
                        0.0
                    };
                });
        });
    log::info!(
        "Flat-field corrected {} projections against {} flats",
        projections.len_of(Axis(1)),
        flats.len_of(Axis(0))
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    #[test]
    fn test_recovers_attenuation() {
        let dark = Array2::from_elem((4, 5), 1.0f32);
        // flats average to 11, so the open beam is 10 above dark
        let flats = Array3::from_shape_fn((2, 4, 5), |(f, _, _)| if f == 0 { 10.0 } else { 12.0 });
        let mut data =
            Array3::from_shape_fn((4, 3, 5), |(_, a, _)| 1.0 + 10.0 * (-0.5 * a as f32).exp());

        flat_field_log(&mut data, &dark.view(), &flats.view()).unwrap();

        for ((_, a, _), &v) in data.indexed_iter() {
            assert_abs_diff_eq!(v, 0.5 * a as f32, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_dead_pixel_and_floor() {
        let mut dark = Array2::from_elem((2, 2), 0.0f32);
        dark[[0, 0]] = 5.0;
        let flats = Array3::from_elem((1, 2, 2), 5.0f32);
        let mut data = Array3::from_elem((2, 1, 2), 2.5f32);
        data[[1, 0, 1]] = -1.0;

        flat_field_log(&mut data, &dark.view(), &flats.view()).unwrap();

        // flat equals dark: no open beam
        assert_eq!(data[[0, 0, 0]], 0.0);
        assert_abs_diff_eq!(data[[0, 0, 1]], 2.0f32.ln(), epsilon = 1e-6);
        assert_abs_diff_eq!(data[[1, 0, 1]], -TRANSMISSION_FLOOR.ln(), epsilon = 1e-4);
    }

    #[test]
    fn test_rejects_mismatched_frames() {
        let mut data = Array3::<f32>::ones((4, 2, 5));
        let flats = Array3::<f32>::ones((1, 4, 5));
        let bad_dark = Array2::<f32>::zeros((5, 4));
        assert!(flat_field_log(&mut data, &bad_dark.view(), &flats.view()).is_err());

        let dark = Array2::<f32>::zeros((4, 5));
        let bad_flats = Array3::<f32>::ones((1, 4, 4));
        assert!(flat_field_log(&mut data, &dark.view(), &bad_flats.view()).is_err());

        let no_flats = Array3::<f32>::ones((0, 4, 5));
        assert!(flat_field_log(&mut data, &dark.view(), &no_flats.view()).is_err());
    }
}
