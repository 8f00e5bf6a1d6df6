//! Tonal mapping: Threshold, Histogram Equalization, Otsu.
//!
//! All three work on the luminance plane. Color input is converted to
//! grayscale on entry and the result is a single-channel image.

use ndarray::Array2;

use crate::error::{ensure_range, EngineResult};
use crate::image::ImageMatrix;

// ============================================================================
// Histogram
// ============================================================================

/// Count occurrences of each gray level.
pub fn histogram(plane: &Array2<u8>) -> [u64; 256] {
    let mut hist = [0u64; 256];
    for &v in plane.iter() {
        hist[v as usize] += 1;
    }
    hist
}

// ============================================================================
// Threshold
// ============================================================================

/// Binary threshold: 255 where `pixel > t`, 0 elsewhere.
///
/// # Arguments
/// * `image` - Grayscale or RGB image (converted to grayscale)
/// * `t` - Threshold in [0, 255]
///
/// # Returns
/// Single-channel binary image
pub fn threshold(image: &ImageMatrix, t: f64) -> EngineResult<ImageMatrix> {
    let t = ensure_range("threshold", t, 0.0, 255.0)?;
    let plane = image.gray_plane();
    let binary = plane.mapv(|v| if f64::from(v) > t { 255 } else { 0 });
    ImageMatrix::from_gray(binary)
}

// ============================================================================
// Histogram Equalization
// ============================================================================

/// Global histogram equalization of the luminance plane.
///
/// Maps level `i` to `round((cdf(i) - cdf_min) * 255 / (N - cdf_min))`,
/// where `cdf_min` is the count of the darkest occupied level. A constant
/// image has nothing to spread and comes back unchanged.
pub fn equalize_histogram(image: &ImageMatrix) -> ImageMatrix {
    let plane = image.gray_plane();
    let hist = histogram(&plane);
    let total = plane.len() as u64;

    let first = hist.iter().position(|&count| count > 0).unwrap_or(0);
    let cdf_min = hist[first];
    if cdf_min == total {
        return image.to_gray();
    }

    let scale = 255.0 / (total - cdf_min) as f64;
    let mut lut = [0u8; 256];
    let mut cdf = 0u64;
    for level in first..256 {
        cdf += hist[level];
        let mapped = ((cdf - cdf_min) as f64 * scale).round();
        lut[level] = mapped.clamp(0.0, 255.0) as u8;
    }

    ImageMatrix::from_array_unchecked(
        plane.mapv(|v| lut[v as usize]).insert_axis(ndarray::Axis(2)),
    )
}

// ============================================================================
// Otsu
// ============================================================================

/// Otsu's threshold for a gray plane.
///
/// Picks the level `t` maximizing the between-class variance of the
/// split `{<= t}` / `{> t}`. Ties keep the lowest level. A plane with a
/// single gray level returns 0.
pub fn otsu_threshold(plane: &Array2<u8>) -> u8 {
    let hist = histogram(plane);
    let total = plane.len() as f64;
    let sum_all: f64 = hist
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut weight_low = 0.0;
    let mut sum_low = 0.0;
    let mut best_variance = 0.0;
    let mut best = 0u8;

    for (level, &count) in hist.iter().enumerate() {
        weight_low += count as f64;
        sum_low += level as f64 * count as f64;
        let weight_high = total - weight_low;
        if weight_low == 0.0 || weight_high == 0.0 {
            continue;
        }

        let mean_low = sum_low / weight_low;
        let mean_high = (sum_all - sum_low) / weight_high;
        let variance = weight_low * weight_high * (mean_low - mean_high).powi(2);
        if variance > best_variance {
            best_variance = variance;
            best = level as u8;
        }
    }

    best
}
