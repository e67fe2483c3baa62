//! Geometry fix-up for 2x2 Medipix detector assemblies.

use ndarray::{Array3, Axis, Slice};

use crate::PreprocessError;

/// Pixels each half moves away from the chip boundary.
const GAP: usize = 2;

/// Open up the inter-chip gap of a quad Medipix stack in place.
///
/// Along the column axis and then the row axis, the lower half moves `GAP`
/// pixels toward index 0 and the upper half `GAP` pixels the other way. The
/// outermost `GAP` pixels on each side are dropped; the gap pixels repeat the
/// nearest pixel on their own side of the boundary.
pub fn medipix_quadrant_shift(data: &mut Array3<f32>) -> Result<(), PreprocessError> {
    for axis in [2, 0] {
        let length = data.len_of(Axis(axis));
        if length < 2 * GAP + 2 {
            return Err(PreprocessError::DimensionMismatch(format!(
                "axis {axis} has {length} pixels, at least {} needed for the chip gap",
                2 * GAP + 2
            )));
        }
    }
    widen_centre(data, Axis(2));
    widen_centre(data, Axis(0));
    log::debug!("Medipix quadrant gap applied to {:?} stack", data.dim());
    Ok(())
}

fn widen_centre(data: &mut Array3<f32>, axis: Axis) {
    let length = data.len_of(axis);
    let half = length / 2;

    let lower = data.slice_axis(axis, Slice::from(GAP..half)).to_owned();
    let upper = data.slice_axis(axis, Slice::from(half..length - GAP)).to_owned();
    data.slice_axis_mut(axis, Slice::from(0..half - GAP)).assign(&lower);
    data.slice_axis_mut(axis, Slice::from(half + GAP..length)).assign(&upper);

    let lower_edge = data.index_axis(axis, half - GAP - 1).to_owned();
    let upper_edge = data.index_axis(axis, half + GAP).to_owned();
    for index in half - GAP..half {
        data.index_axis_mut(axis, index).assign(&lower_edge);
    }
    for index in half..half + GAP {
        data.index_axis_mut(axis, index).assign(&upper_edge);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_and_rows_move_apart() {
        let mut data = Array3::from_shape_fn((8, 2, 8), |(r, _, c)| (10 * r + c) as f32);
        medipix_quadrant_shift(&mut data).unwrap();

        let moved = [2, 3, 3, 3, 4, 4, 4, 5];
        for r in 0..8 {
            for a in 0..2 {
                for c in 0..8 {
                    let expected = (10 * moved[r] + moved[c]) as f32;
                    assert_eq!(data[[r, a, c]], expected, "at ({r}, {a}, {c})");
                }
            }
        }
    }

    #[test]
    fn test_odd_length_keeps_shape() {
        let mut data = Array3::from_shape_fn((6, 1, 7), |(_, _, c)| c as f32);
        medipix_quadrant_shift(&mut data).unwrap();

        assert_eq!(data.dim(), (6, 1, 7));
        // half = 3: lower half 2..3 moves to 0..1, upper 3..5 moves to 5..7
        let row: Vec<f32> = data.slice(ndarray::s![0, 0, ..]).to_vec();
        assert_eq!(row, vec![2.0, 2.0, 2.0, 3.0, 3.0, 3.0, 4.0]);
    }

    #[test]
    fn test_rejects_small_detector() {
        let mut data = Array3::<f32>::zeros((5, 1, 8));
        assert!(medipix_quadrant_shift(&mut data).is_err());
        let mut data = Array3::<f32>::zeros((8, 1, 5));
        assert!(medipix_quadrant_shift(&mut data).is_err());
    }
}
