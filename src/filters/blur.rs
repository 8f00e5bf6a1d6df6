//! Smoothing filters: Mean, Median, Gaussian.
//!
//! All filters run per channel over an odd `W x W` window with
//! reflect-101 borders, and keep the input's channel count.

use ndarray::Array3;

use super::core::{convolve_channels, gaussian_kernel, reflect_index};
use crate::error::{ensure_window, EngineResult};
use crate::image::ImageMatrix;

/// Largest accepted smoothing window.
pub const MAX_WINDOW: usize = 31;

/// Collect the `window x window` neighbourhood of `(y, x, c)`.
#[inline]
fn gather_window(input: &Array3<u8>, y: usize, x: usize, c: usize, window: usize, values: &mut Vec<u8>) {
    let (height, width, _) = input.dim();
    let half = (window / 2) as isize;
    values.clear();

    for dy in -half..=half {
        let sy = reflect_index(y as isize + dy, height);
        for dx in -half..=half {
            let sx = reflect_index(x as isize + dx, width);
            values.push(input[[sy, sx, c]]);
        }
    }
}

// ============================================================================
// Mean Filter
// ============================================================================

/// Replace every sample with the rounded average of its window.
///
/// # Arguments
/// * `image` - Grayscale or RGB image
/// * `window` - Odd window size in [1, 31]
///
/// # Returns
/// Smoothed image with the same channel count
pub fn mean_filter(image: &ImageMatrix, window: usize) -> EngineResult<ImageMatrix> {
    let window = ensure_window("mean window", window, MAX_WINDOW)?;
    let input = image.as_array();
    let (height, width, channels) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, channels));

    let count = (window * window) as u32;
    let mut values = Vec::with_capacity(window * window);

    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                gather_window(input, y, x, c, window, &mut values);
                let sum: u32 = values.iter().map(|&v| v as u32).sum();
                // Round half up
                output[[y, x, c]] = ((sum + count / 2) / count) as u8;
            }
        }
    }

    Ok(ImageMatrix::from_array_unchecked(output))
}

// ============================================================================
// Median Filter
// ============================================================================

/// Replace every sample with the median of its window.
///
/// Removes salt-and-pepper noise while preserving edges.
///
/// # Arguments
/// * `image` - Grayscale or RGB image
/// * `window` - Odd window size in [1, 31]
///
/// # Returns
/// Median-filtered image with the same channel count
pub fn median_filter(image: &ImageMatrix, window: usize) -> EngineResult<ImageMatrix> {
    let window = ensure_window("median window", window, MAX_WINDOW)?;
    let input = image.as_array();
    let (height, width, channels) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, channels));

    let mut values = Vec::with_capacity(window * window);

    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                gather_window(input, y, x, c, window, &mut values);
                let mid = values.len() / 2;
                let (_, median, _) = values.select_nth_unstable(mid);
                output[[y, x, c]] = *median;
            }
        }
    }

    Ok(ImageMatrix::from_array_unchecked(output))
}

// ============================================================================
// Gaussian Blur
// ============================================================================

/// Gaussian blur with the default sigma for `window`, rounded to 8 bits.
///
/// # Arguments
/// * `image` - Grayscale or RGB image
/// * `window` - Odd window size in [1, 31]
pub fn gaussian_blur(image: &ImageMatrix, window: usize) -> EngineResult<ImageMatrix> {
    let window = ensure_window("gaussian window", window, MAX_WINDOW)?;
    let kernel = gaussian_kernel(window)?;
    let blurred = convolve_channels(&image.to_working(), &kernel);
    Ok(ImageMatrix::from_working(&blurred.mapv(f32::round)))
}
