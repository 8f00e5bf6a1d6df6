//! Canny edge detection.
//!
//! A multi-stage pipeline rather than a single convolution:
//! 1. 5x5 Gaussian smoothing
//! 2. Sobel gradients, magnitude `sqrt(gx² + gy²)` and direction
//! 3. Non-maximum suppression across the gradient direction
//! 4. Double threshold with `high = 2 * low`
//! 5. Hysteresis: weak pixels survive only when 8-connected to a strong one
//!
//! Output is a single-channel binary image (edges 255).

use std::collections::VecDeque;

use ndarray::Array2;

use super::core::{convolve_plane, gaussian_kernel, Kernel};
use super::edge::{gradient_magnitude, SOBEL_X, SOBEL_Y};
use crate::error::{ensure_finite, EngineError, EngineResult};
use crate::image::ImageMatrix;

const SMOOTHING_WINDOW: usize = 5;

const NEIGHBORS_8: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeClass {
    None,
    Weak,
    Strong,
}

/// Offsets of the two neighbours along the gradient direction.
///
/// The angle is quantized to 0, 45, 90 or 135 degrees (y axis pointing down).
#[inline]
fn gradient_neighbors(gx: f32, gy: f32) -> [(isize, isize); 2] {
    let angle = gy.atan2(gx).to_degrees().rem_euclid(180.0);
    if !(22.5..157.5).contains(&angle) {
        [(0, -1), (0, 1)]
    } else if angle < 67.5 {
        [(-1, -1), (1, 1)]
    } else if angle < 112.5 {
        [(-1, 0), (1, 0)]
    } else {
        [(1, -1), (-1, 1)]
    }
}

/// Magnitude at `(y + dy, x + dx)`, 0 outside the plane.
#[inline]
fn magnitude_at(mag: &Array2<f32>, y: usize, x: usize, (dy, dx): (isize, isize)) -> f32 {
    let (height, width) = mag.dim();
    let ny = y as isize + dy;
    let nx = x as isize + dx;
    if ny < 0 || nx < 0 || ny >= height as isize || nx >= width as isize {
        return 0.0;
    }
    mag[[ny as usize, nx as usize]]
}

/// Canny edge map with thresholds `(low, 2 * low)`.
///
/// # Arguments
/// * `image` - Grayscale or RGB image (converted to grayscale)
/// * `low` - Lower hysteresis threshold, `>= 0`
///
/// # Returns
/// Binary single-channel image, 255 on edges
pub fn canny(image: &ImageMatrix, low: f64) -> EngineResult<ImageMatrix> {
    let low = ensure_finite("canny threshold", low)?;
    if low < 0.0 {
        return Err(EngineError::domain(format!(
            "canny threshold must be non-negative, got {low}"
        )));
    }
    let low = low as f32;
    let high = 2.0 * low;

    let smoothed = convolve_plane(&image.gray_working(), &gaussian_kernel(SMOOTHING_WINDOW)?);
    let gx = convolve_plane(&smoothed, &Kernel::from_rows(SOBEL_X)?);
    let gy = convolve_plane(&smoothed, &Kernel::from_rows(SOBEL_Y)?);
    let mag = gradient_magnitude(&gx, &gy);

    let (height, width) = mag.dim();
    let mut classes = Array2::from_elem((height, width), EdgeClass::None);
    let mut queue = VecDeque::new();

    // Non-maximum suppression and double threshold
    for y in 0..height {
        for x in 0..width {
            let m = mag[[y, x]];
            if m <= low {
                continue;
            }
            let [before, after] = gradient_neighbors(gx[[y, x]], gy[[y, x]]);
            if !(m > magnitude_at(&mag, y, x, before) && m >= magnitude_at(&mag, y, x, after)) {
                continue;
            }
            if m > high {
                classes[[y, x]] = EdgeClass::Strong;
                queue.push_back((y, x));
            } else {
                classes[[y, x]] = EdgeClass::Weak;
            }
        }
    }

    // Hysteresis
    while let Some((y, x)) = queue.pop_front() {
        for (dy, dx) in NEIGHBORS_8 {
            let ny = y as isize + dy;
            let nx = x as isize + dx;
            if ny < 0 || nx < 0 || ny >= height as isize || nx >= width as isize {
                continue;
            }
            let (ny, nx) = (ny as usize, nx as usize);
            if classes[[ny, nx]] == EdgeClass::Weak {
                classes[[ny, nx]] = EdgeClass::Strong;
                queue.push_back((ny, nx));
            }
        }
    }

    ImageMatrix::from_gray(classes.mapv(|c| if c == EdgeClass::Strong { 255 } else { 0 }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_image_has_no_edges() {
        let img = ImageMatrix::filled(8, 8, 1, 128).unwrap();
        let result = canny(&img, 10.0).unwrap();
        assert!(result.as_array().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_step_edge_is_one_pixel_wide() {
        let img = ImageMatrix::from_gray_fn(10, 10, |_, x| if x < 5 { 0 } else { 255 }).unwrap();
        let result = canny(&img, 50.0).unwrap();
        for y in 0..10 {
            for x in 0..10 {
                let expected = if x == 4 { 255 } else { 0 };
                assert_eq!(result.get(y, x, 0), expected, "at ({y}, {x})");
            }
        }
    }

    #[test]
    fn test_high_threshold_suppresses_everything() {
        let img = ImageMatrix::from_gray_fn(10, 10, |_, x| if x < 5 { 0 } else { 255 }).unwrap();
        let result = canny(&img, 1000.0).unwrap();
        assert!(result.as_array().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_output_is_binary() {
        let img = ImageMatrix::from_gray_fn(12, 12, |y, x| ((x * x + y * 7) % 256) as u8).unwrap();
        let result = canny(&img, 20.0).unwrap();
        assert!(result.as_array().iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let img = ImageMatrix::filled(4, 4, 1, 0).unwrap();
        assert!(canny(&img, -1.0).is_err());
    }

    #[test]
    fn test_gradient_direction_bins() {
        assert_eq!(gradient_neighbors(1.0, 0.0), [(0, -1), (0, 1)]);
        assert_eq!(gradient_neighbors(0.0, 1.0), [(-1, 0), (1, 0)]);
        assert_eq!(gradient_neighbors(1.0, 1.0), [(-1, -1), (1, 1)]);
        assert_eq!(gradient_neighbors(-1.0, 1.0), [(1, -1), (-1, 1)]);
    }
}
