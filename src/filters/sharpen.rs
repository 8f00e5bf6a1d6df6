//! Sharpening filters: Highpass, Highboost, fixed Convolution.
//!
//! All three operate on the luminance plane and return a single-channel
//! image.

use super::core::{convolve_plane, gaussian_kernel, Kernel};
use crate::error::{ensure_range, EngineResult};
use crate::image::ImageMatrix;

/// 8-neighbour Laplacian-like highpass kernel.
const HIGHPASS: [[f32; 3]; 3] = [[-1.0, -1.0, -1.0], [-1.0, 8.0, -1.0], [-1.0, -1.0, -1.0]];

/// Gaussian window used to extract the lowpass part for highboost.
const HIGHBOOST_WINDOW: usize = 5;

// ============================================================================
// Highpass
// ============================================================================

/// Highpass sharpening with the 8-neighbour kernel scaled by `strength`.
///
/// # Arguments
/// * `image` - Grayscale or RGB image (converted to grayscale)
/// * `strength` - Kernel scale in [0, 2]; 0 yields a black image
pub fn highpass(image: &ImageMatrix, strength: f64) -> EngineResult<ImageMatrix> {
    let strength = ensure_range("highpass strength", strength, 0.0, 2.0)? as f32;
    let kernel = Kernel::from_rows(HIGHPASS)?.scaled(strength);
    let filtered = convolve_plane(&image.gray_working(), &kernel);
    Ok(ImageMatrix::from_gray_working(&filtered))
}

/// The fixed "Convolution" filter: highpass at full strength.
pub fn convolution(image: &ImageMatrix) -> EngineResult<ImageMatrix> {
    highpass(image, 1.0)
}

// ============================================================================
// Highboost
// ============================================================================

/// Highboost: `A * image - gaussian_blur(image)`.
///
/// The blur is a 5x5 Gaussian kept in floating point.
///
/// # Arguments
/// * `image` - Grayscale or RGB image (converted to grayscale)
/// * `amplification` - `A` in [1, 5]
pub fn highboost(image: &ImageMatrix, amplification: f64) -> EngineResult<ImageMatrix> {
    let a = ensure_range("highboost amplification", amplification, 1.0, 5.0)? as f32;
    let gray = image.gray_working();
    let blurred = convolve_plane(&gray, &gaussian_kernel(HIGHBOOST_WINDOW)?);
    let boosted = &gray * a - &blurred;
    Ok(ImageMatrix::from_gray_working(&boosted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot() -> ImageMatrix {
        ImageMatrix::from_gray_fn(5, 5, |y, x| if y == 2 && x == 2 { 100 } else { 0 }).unwrap()
    }

    #[test]
    fn test_highpass_flat_is_black() {
        let img = ImageMatrix::filled(4, 4, 1, 200).unwrap();
        let result = highpass(&img, 1.0).unwrap();
        assert!(result.as_array().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_highpass_strength_scales_center() {
        assert_eq!(highpass(&dot(), 1.0).unwrap().get(2, 2, 0), 255);
        assert_eq!(highpass(&dot(), 0.25).unwrap().get(2, 2, 0), 200);
        assert_eq!(highpass(&dot(), 0.0).unwrap().get(2, 2, 0), 0);
        // neighbours go negative and clip
        assert_eq!(highpass(&dot(), 1.0).unwrap().get(1, 1, 0), 0);
    }

    #[test]
    fn test_highpass_out_of_range() {
        assert!(highpass(&dot(), 2.5).is_err());
    }

    #[test]
    fn test_convolution_matches_full_highpass() {
        let img = ImageMatrix::from_gray_fn(6, 6, |y, x| ((y * 31 + x * 17) % 256) as u8).unwrap();
        assert_eq!(convolution(&img).unwrap(), highpass(&img, 1.0).unwrap());
    }

    #[test]
    fn test_highboost_flat_scales() {
        // (A - 1) * v on a flat image
        let img = ImageMatrix::filled(5, 5, 1, 100).unwrap();
        let result = highboost(&img, 2.0).unwrap();
        let v = result.get(2, 2, 0);
        assert!((99..=100).contains(&v));
    }

    #[test]
    fn test_highboost_out_of_range() {
        assert!(highboost(&dot(), 0.5).is_err());
        assert!(highboost(&dot(), 5.5).is_err());
    }

    #[test]
    fn test_output_is_gray() {
        let img = ImageMatrix::filled(3, 3, 3, 10).unwrap();
        assert_eq!(highboost(&img, 1.5).unwrap().channels(), 1);
    }
}
