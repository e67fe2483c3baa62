//! Analytic phantom volumes.

use crate::SimulationError;
use ndarray::Array3;

/// Phantom shapes, centred in the volume.
///
/// Lengths are in voxels. The centre of an axis of length `n` is voxel `n / 2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phantom {
    /// Hollow sphere: voxels with `(R - wall)^2 < d^2 < R^2`.
    Bubble { outer_radius: f64, wall: f64 },
    /// Solid sphere: voxels with `d^2 < R^2`.
    Pearl { radius: f64 },
}

impl Phantom {
    fn validate(&self) -> Result<(), SimulationError> {
        match *self {
            Phantom::Bubble { outer_radius, wall } => {
                if !(outer_radius.is_finite() && outer_radius > 0.0) {
                    return Err(SimulationError::InvalidPhantom(format!(
                        "outer radius must be positive, got {outer_radius}"
                    )));
                }
                if !(wall.is_finite() && wall > 0.0 && wall <= outer_radius) {
                    return Err(SimulationError::InvalidPhantom(format!(
                        "wall thickness must be in (0, {outer_radius}], got {wall}"
                    )));
                }
            }
            Phantom::Pearl { radius } => {
                if !(radius.is_finite() && radius > 0.0) {
                    return Err(SimulationError::InvalidPhantom(format!(
                        "radius must be positive, got {radius}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Whether a voxel at squared distance `d2` from the centre is inside.
    fn contains(&self, d2: f64) -> bool {
        match *self {
            Phantom::Bubble { outer_radius, wall } => {
                let inner = outer_radius - wall;
                d2 > inner * inner && d2 < outer_radius * outer_radius
            }
            Phantom::Pearl { radius } => d2 < radius * radius,
        }
    }
}

/// Generate a binary phantom volume (1 inside the shape, 0 elsewhere).
pub fn phantom(shape: (usize, usize, usize), kind: Phantom) -> Result<Array3<f32>, SimulationError> {
    kind.validate()?;

    let centre = |i: usize, n: usize| i as f64 - (n / 2) as f64;
    Ok(Array3::from_shape_fn(shape, |(x, y, z)| {
        let dx = centre(x, shape.0);
        let dy = centre(y, shape.1);
        let dz = centre(z, shape.2);
        if kind.contains(dx * dx + dy * dy + dz * dz) {
            1.0
        } else {
            0.0
        }
    }))
}
