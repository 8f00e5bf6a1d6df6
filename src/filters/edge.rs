//! Edge detection filters: Sobel, Prewitt, Roberts, Laplacian, LoG, Compass.
//!
//! These filters detect and highlight edges in images.
//!
//! ## Supported Formats
//!
//! All filters accept grayscale or RGB input and work on the luminance
//! plane. Output is always a single-channel image with responses clipped
//! to [0, 255].

use ndarray::{Array2, Zip};

use super::blur::gaussian_blur;
use super::core::{convolve_plane, Kernel};
use crate::error::{ensure_window, EngineResult};
use crate::image::ImageMatrix;

/// Largest accepted LoG window.
pub const MAX_LOG_WINDOW: usize = 15;

pub(crate) const SOBEL_X: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
pub(crate) const SOBEL_Y: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

const PREWITT_X: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0]];
const PREWITT_Y: [[f32; 3]; 3] = [[-1.0, -1.0, -1.0], [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]];

const ROBERTS_X: [[f32; 2]; 2] = [[1.0, 0.0], [0.0, -1.0]];
const ROBERTS_Y: [[f32; 2]; 2] = [[0.0, 1.0], [-1.0, 0.0]];

const LAPLACIAN: [[f32; 3]; 3] = [[0.0, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]];

/// Kirsch compass kernels: N, NE, E, SE, S, SW, W, NW.
const KIRSCH: [[[f32; 3]; 3]; 8] = [
    [[5.0, 5.0, 5.0], [-3.0, 0.0, -3.0], [-3.0, -3.0, -3.0]],
    [[5.0, 5.0, -3.0], [5.0, 0.0, -3.0], [-3.0, -3.0, -3.0]],
    [[5.0, -3.0, -3.0], [5.0, 0.0, -3.0], [5.0, -3.0, -3.0]],
    [[-3.0, -3.0, -3.0], [5.0, 0.0, -3.0], [5.0, 5.0, -3.0]],
    [[-3.0, -3.0, -3.0], [-3.0, 0.0, -3.0], [5.0, 5.0, 5.0]],
    [[-3.0, -3.0, -3.0], [-3.0, 0.0, 5.0], [-3.0, 5.0, 5.0]],
    [[-3.0, -3.0, 5.0], [-3.0, 0.0, 5.0], [-3.0, -3.0, 5.0]],
    [[-3.0, 5.0, 5.0], [-3.0, 0.0, 5.0], [-3.0, -3.0, -3.0]],
];

/// `sqrt(gx² + gy²)` for two gradient planes.
pub(crate) fn gradient_magnitude(gx: &Array2<f32>, gy: &Array2<f32>) -> Array2<f32> {
    Zip::from(gx).and(gy).map_collect(|&a, &b| (a * a + b * b).sqrt())
}

/// Magnitude of the response to a pair of directional kernels.
fn gradient_filter(image: &ImageMatrix, kx: &Kernel, ky: &Kernel) -> ImageMatrix {
    let gray = image.gray_working();
    let gx = convolve_plane(&gray, kx);
    let gy = convolve_plane(&gray, ky);
    ImageMatrix::from_gray_working(&gradient_magnitude(&gx, &gy))
}

// ============================================================================
// Gradient Operators
// ============================================================================

/// Sobel gradient magnitude.
pub fn sobel(image: &ImageMatrix) -> EngineResult<ImageMatrix> {
    Ok(gradient_filter(
        image,
        &Kernel::from_rows(SOBEL_X)?,
        &Kernel::from_rows(SOBEL_Y)?,
    ))
}

/// Prewitt gradient magnitude.
pub fn prewitt(image: &ImageMatrix) -> EngineResult<ImageMatrix> {
    Ok(gradient_filter(
        image,
        &Kernel::from_rows(PREWITT_X)?,
        &Kernel::from_rows(PREWITT_Y)?,
    ))
}

/// Roberts cross gradient magnitude (diagonal differences).
pub fn roberts(image: &ImageMatrix) -> EngineResult<ImageMatrix> {
    Ok(gradient_filter(
        image,
        &Kernel::from_2x2(ROBERTS_X),
        &Kernel::from_2x2(ROBERTS_Y),
    ))
}

// ============================================================================
// Laplacian
// ============================================================================

/// Absolute response of the 4-neighbour Laplacian.
pub fn laplacian(image: &ImageMatrix) -> EngineResult<ImageMatrix> {
    laplacian_plane(&image.gray_working())
}

fn laplacian_plane(gray: &Array2<f32>) -> EngineResult<ImageMatrix> {
    let response = convolve_plane(gray, &Kernel::from_rows(LAPLACIAN)?);
    Ok(ImageMatrix::from_gray_working(&response.mapv(f32::abs)))
}

/// Laplacian of Gaussian.
///
/// The luminance plane is Gaussian-blurred (rounded to 8 bits), then the
/// absolute Laplacian is taken.
///
/// # Arguments
/// * `image` - Grayscale or RGB image
/// * `window` - Odd Gaussian window in [1, 15]
pub fn laplacian_of_gaussian(image: &ImageMatrix, window: usize) -> EngineResult<ImageMatrix> {
    let window = ensure_window("LoG window", window, MAX_LOG_WINDOW)?;
    let blurred = gaussian_blur(&image.to_gray(), window)?;
    laplacian_plane(&blurred.gray_working())
}

// ============================================================================
// Compass
// ============================================================================

/// Kirsch compass edge detection.
///
/// Convolves with all eight directional kernels and keeps the largest
/// absolute response per pixel.
pub fn compass(image: &ImageMatrix) -> EngineResult<ImageMatrix> {
    let gray = image.gray_working();
    let mut strongest = Array2::<f32>::zeros(gray.dim());

    for rows in KIRSCH {
        let response = convolve_plane(&gray, &Kernel::from_rows(rows)?);
        Zip::from(&mut strongest)
            .and(&response)
            .for_each(|best, &r| *best = best.max(r.abs()));
    }

    Ok(ImageMatrix::from_gray_working(&strongest))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 5x5 with the two left columns black and the rest white.
    fn vertical_edge() -> ImageMatrix {
        ImageMatrix::from_gray_fn(5, 5, |_, x| if x < 2 { 0 } else { 255 }).unwrap()
    }

    fn column(img: &ImageMatrix, x: usize) -> Vec<u8> {
        (0..img.height()).map(|y| img.get(y, x, 0)).collect()
    }

    #[test]
    fn test_sobel_vertical_edge() {
        let result = sobel(&vertical_edge()).unwrap();
        assert_eq!(result.channels(), 1);
        assert_eq!(column(&result, 0), vec![0; 5]);
        assert_eq!(column(&result, 1), vec![255; 5]);
        assert_eq!(column(&result, 2), vec![255; 5]);
        assert_eq!(column(&result, 3), vec![0; 5]);
        assert_eq!(column(&result, 4), vec![0; 5]);
    }

    #[test]
    fn test_prewitt_vertical_edge() {
        let result = prewitt(&vertical_edge()).unwrap();
        assert_eq!(column(&result, 1), vec![255; 5]);
        assert_eq!(column(&result, 4), vec![0; 5]);
    }

    #[test]
    fn test_roberts_responds_at_edge_only() {
        let result = roberts(&vertical_edge()).unwrap();
        // Forward diagonal differences mark the last column before the step
        assert_eq!(column(&result, 1), vec![255; 5]);
        assert_eq!(column(&result, 0), vec![0; 5]);
        assert_eq!(column(&result, 2), vec![0; 5]);
        assert_eq!(column(&result, 4), vec![0; 5]);
    }

    #[test]
    fn test_flat_image_has_no_edges() {
        let flat = ImageMatrix::filled(6, 6, 3, 90).unwrap();
        for result in [
            sobel(&flat).unwrap(),
            prewitt(&flat).unwrap(),
            roberts(&flat).unwrap(),
            laplacian(&flat).unwrap(),
            laplacian_of_gaussian(&flat, 5).unwrap(),
            compass(&flat).unwrap(),
        ] {
            assert!(result.as_array().iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn test_laplacian_is_absolute() {
        let dot = ImageMatrix::from_gray_fn(3, 3, |y, x| if y == 1 && x == 1 { 50 } else { 0 }).unwrap();
        let result = laplacian(&dot).unwrap();
        assert_eq!(result.get(1, 1, 0), 200);
        // the reflected border sees the dot twice
        assert_eq!(result.get(0, 1, 0), 100);
        assert_eq!(result.get(0, 0, 0), 0);
    }

    #[test]
    fn test_log_window_validation() {
        let img = vertical_edge();
        assert!(laplacian_of_gaussian(&img, 17).is_err());
        assert!(laplacian_of_gaussian(&img, 4).is_err());
        assert!(laplacian_of_gaussian(&img, 1).is_ok());
    }

    #[test]
    fn test_compass_vertical_edge() {
        let result = compass(&vertical_edge()).unwrap();
        assert_eq!(column(&result, 1), vec![255; 5]);
        assert_eq!(column(&result, 2), vec![255; 5]);
    }
}
