//! Region growing from a seed pixel.
//!
//! Grows a 4-connected region over the luminance plane. A pixel joins when
//! its intensity differs from the *seed* intensity by at most the
//! threshold, so the region never drifts along a gradual ramp.

use ndarray::Array2;
use tracing::debug;

use crate::error::{ensure_finite, EngineError, EngineResult};
use crate::image::ImageMatrix;

const NEIGHBORS_4: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Region growing result with metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionGrowingResult {
    /// Region mask (255 = inside, 0 = outside)
    pub mask: ImageMatrix,
    /// Bounds of the region as `(x, y, width, height)`
    pub bounds: (usize, usize, usize, usize),
    /// Number of pixels in the region
    pub pixel_count: usize,
}

/// Grow a region and return its mask.
///
/// # Arguments
/// * `image` - Grayscale or RGB image (converted to grayscale)
/// * `seed` - Start pixel as `(x, y)`; `None` uses `(width / 2, height / 2)`
/// * `threshold` - Largest accepted `|v - seed_value|`, `>= 0`
///
/// # Returns
/// Single-channel mask, 255 inside the region
pub fn region_growing(
    image: &ImageMatrix,
    seed: Option<(usize, usize)>,
    threshold: f64,
) -> EngineResult<ImageMatrix> {
    region_growing_detailed(image, seed, threshold).map(|r| r.mask)
}

/// Grow a region with detailed results.
pub fn region_growing_detailed(
    image: &ImageMatrix,
    seed: Option<(usize, usize)>,
    threshold: f64,
) -> EngineResult<RegionGrowingResult> {
    let threshold = ensure_finite("region threshold", threshold)?;
    if threshold < 0.0 {
        return Err(EngineError::domain(format!(
            "region threshold must be non-negative, got {threshold}"
        )));
    }

    let (height, width) = (image.height(), image.width());
    let (start_x, start_y) = seed.unwrap_or((width / 2, height / 2));
    if start_x >= width || start_y >= height {
        return Err(EngineError::domain(format!(
            "seed ({start_x}, {start_y}) outside {width}x{height} image"
        )));
    }
    debug!(start_x, start_y, threshold, "region growing");

    let gray = image.gray_plane();
    let seed_value = f64::from(gray[[start_y, start_x]]);

    let mut mask = Array2::<u8>::zeros((height, width));
    let mut visited = Array2::from_elem((height, width), false);
    let mut stack = vec![(start_x, start_y)];
    visited[[start_y, start_x]] = true;

    let mut pixel_count = 0;
    let (mut min_x, mut min_y) = (width, height);
    let (mut max_x, mut max_y) = (0, 0);

    while let Some((x, y)) = stack.pop() {
        mask[[y, x]] = 255;
        pixel_count += 1;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);

        for (dx, dy) in NEIGHBORS_4 {
            let nx = x as isize + dx;
            let ny = y as isize + dy;
            if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if visited[[ny, nx]] {
                continue;
            }
            if (f64::from(gray[[ny, nx]]) - seed_value).abs() <= threshold {
                visited[[ny, nx]] = true;
                stack.push((nx, ny));
            }
        }
    }

    Ok(RegionGrowingResult {
        mask: ImageMatrix::from_gray(mask)?,
        bounds: (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1),
        pixel_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_image_fills() {
        let img = ImageMatrix::filled(5, 5, 3, 80).unwrap();
        let result = region_growing_detailed(&img, Some((2, 2)), 0.0).unwrap();
        assert_eq!(result.pixel_count, 25);
        assert_eq!(result.bounds, (0, 0, 5, 5));
        assert!(result.mask.as_array().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_two_regions() {
        let img = ImageMatrix::from_gray_fn(4, 4, |_, x| if x < 2 { 10 } else { 200 }).unwrap();
        let result = region_growing_detailed(&img, Some((0, 0)), 5.0).unwrap();
        assert_eq!(result.pixel_count, 8);
        assert_eq!(result.bounds, (0, 0, 2, 4));
    }

    #[test]
    fn test_compares_against_seed_not_neighbor() {
        // Ramp of step 5: neighbours always differ by 5, seed drift grows
        let img = ImageMatrix::from_gray_fn(1, 9, |_, x| (100 + 5 * x) as u8).unwrap();
        let result = region_growing_detailed(&img, Some((0, 0)), 10.0).unwrap();
        assert_eq!(result.pixel_count, 3);
    }

    #[test]
    fn test_default_seed_is_center() {
        let img = ImageMatrix::from_gray_fn(5, 7, |y, x| if y == 2 && x == 3 { 50 } else { 0 }).unwrap();
        let mask = region_growing(&img, None, 0.0).unwrap();
        assert_eq!(mask.get(2, 3, 0), 255);
        assert_eq!(mask.as_array().iter().filter(|&&v| v == 255).count(), 1);
    }

    #[test]
    fn test_not_diagonally_connected() {
        let img = ImageMatrix::from_gray_fn(3, 3, |y, x| if (x + y) % 2 == 0 { 0 } else { 255 }).unwrap();
        let result = region_growing_detailed(&img, Some((1, 1)), 0.0).unwrap();
        assert_eq!(result.pixel_count, 1);
    }

    #[test]
    fn test_threshold_monotonic() {
        let img = ImageMatrix::from_gray_fn(16, 16, |y, x| ((x * 7 + y * 13) % 60) as u8).unwrap();
        let mut previous = region_growing(&img, Some((8, 8)), 0.0).unwrap();
        for t in 1..=50 {
            let current = region_growing(&img, Some((8, 8)), t as f64).unwrap();
            for (&a, &b) in previous.as_array().iter().zip(current.as_array().iter()) {
                assert!(a == 0 || b == 255, "region shrank at T={t}");
            }
            previous = current;
        }
    }

    #[test]
    fn test_bad_arguments() {
        let img = ImageMatrix::new(4, 4, 1).unwrap();
        assert!(region_growing(&img, Some((4, 0)), 1.0).is_err());
        assert!(region_growing(&img, Some((0, 0)), -1.0).is_err());
        assert!(region_growing(&img, None, f64::NAN).is_err());
    }
}
