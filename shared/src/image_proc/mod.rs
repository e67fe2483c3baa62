//! Image processing for projection and reconstruction data.
//!
//! # Module Organization
//!
//! ## Focus and edges
//! - **gradient**: discrete gradients and gradient energy (sharpness proxy)
//! - **laplace**: 5-point Laplacian edge filter
//!
//! ## Geometry
//! - **moments**: intensity moments and centre of mass of 3D stacks
//! - **resample**: linear-interpolation translation and rotation of 2D images
//! - **registration**: subpixel translation estimation by cross-correlation
//!
//! ## Filtering
//! - **median**: sliding-window median filter
//!
//! Boundary handling follows the mirror convention `d c b a | a b c d | d c b a`
//! wherever a filter reads outside the image.

pub mod gradient;
pub mod laplace;
pub mod median;
pub mod moments;
pub mod registration;
pub mod resample;

pub use gradient::{gradient, gradient_energy, gradient_energy_2d};
pub use laplace::laplace;
pub use median::median_filter;
pub use moments::{centre_of_mass, moment};
pub use registration::{register_translation, Registration, RegistrationError};
pub use resample::{rotate_image, shift_image};

/// Mirror an out-of-range index back into `0..n` (edge sample repeated).
pub(crate) fn reflect_index(index: isize, n: usize) -> usize {
    let n = n as isize;
    let period = 2 * n;
    let mut m = index.rem_euclid(period);
    if m >= n {
        m = period - 1 - m;
    }
    m as usize
}

#[cfg(test)]
mod tests {
    use super::reflect_index;

    #[test]
    fn test_reflect_index() {
        let mapped: Vec<usize> = (-3..7).map(|i| reflect_index(i, 4)).collect();
        assert_eq!(mapped, vec![2, 1, 0, 0, 1, 2, 3, 3, 2, 1]);
        assert_eq!(reflect_index(-1, 1), 0);
        assert_eq!(reflect_index(5, 1), 0);
    }
}
