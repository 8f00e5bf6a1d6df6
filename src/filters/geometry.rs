//! Geometric transforms: Translate, Rotate, Zoom, Resize, Flip, Crop.
//!
//! Every transform returns a new buffer; the ones that change dimensions
//! (rotate with canvas expansion, zoom, resize, crop) never touch the
//! input. Vacated or uncovered areas are filled with black.
//!
//! Resampling is separable (horizontal then vertical pass). When shrinking,
//! the filter support widens by the scale factor so the output is
//! antialiased.

use ndarray::{s, Array3, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, EngineError, EngineResult};
use crate::image::ImageMatrix;

// ============================================================================
// Resampling Filters
// ============================================================================

/// Resampling filter for [`resize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResampleFilter {
    /// Nearest neighbour (blocky, exact for integer upscales).
    Nearest,
    /// Triangle filter.
    #[default]
    Bilinear,
    /// Windowed sinc with three lobes.
    Lanczos3,
}

impl ResampleFilter {
    #[inline]
    fn support(self) -> f32 {
        match self {
            ResampleFilter::Nearest => 0.5,
            ResampleFilter::Bilinear => 1.0,
            ResampleFilter::Lanczos3 => 3.0,
        }
    }

    #[inline]
    fn weight(self, x: f32) -> f32 {
        let ax = x.abs();
        match self {
            ResampleFilter::Nearest => {
                if ax < 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            ResampleFilter::Bilinear => (1.0 - ax).max(0.0),
            ResampleFilter::Lanczos3 => {
                if ax < 1e-8 {
                    1.0
                } else if ax < 3.0 {
                    let pi_x = std::f32::consts::PI * ax;
                    let pi_x_a = pi_x / 3.0;
                    (pi_x.sin() / pi_x) * (pi_x_a.sin() / pi_x_a)
                } else {
                    0.0
                }
            }
        }
    }
}

/// Resample along one axis of a working array.
fn resample_axis(src: &Array3<f32>, axis: Axis, dst_len: usize, filter: ResampleFilter) -> Array3<f32> {
    let src_len = src.len_of(axis);
    let mut dim = src.raw_dim();
    dim[axis.index()] = dst_len;
    let mut dst = Array3::<f32>::zeros(dim);

    let scale = src_len as f32 / dst_len as f32;
    let filter_scale = scale.max(1.0);
    let support = filter.support() * filter_scale;

    for i in 0..dst_len {
        let mut out = dst.index_axis_mut(axis, i);

        if filter == ResampleFilter::Nearest {
            let si = (((i as f32 + 0.5) * scale) as usize).min(src_len - 1);
            out.assign(&src.index_axis(axis, si));
            continue;
        }

        let center = (i as f32 + 0.5) * scale - 0.5;
        let lo = (center - support).floor().max(0.0) as usize;
        let hi = ((center + support).ceil().max(0.0) as usize).min(src_len - 1);

        let mut weight_sum = 0.0f32;
        for si in lo..=hi {
            let w = filter.weight((si as f32 - center) / filter_scale);
            if w == 0.0 {
                continue;
            }
            weight_sum += w;
            out.scaled_add(w, &src.index_axis(axis, si));
        }
        if weight_sum != 0.0 {
            out.mapv_inplace(|v| v / weight_sum);
        }
    }

    dst
}

// ============================================================================
// Resize / Zoom
// ============================================================================

/// Resize to `height x width`.
///
/// # Arguments
/// * `image` - Grayscale or RGB image
/// * `height`, `width` - Target size, both at least 1
/// * `filter` - Resampling filter
pub fn resize(
    image: &ImageMatrix,
    height: usize,
    width: usize,
    filter: ResampleFilter,
) -> EngineResult<ImageMatrix> {
    if height == 0 || width == 0 {
        return Err(EngineError::domain(format!(
            "resize target must be at least 1x1, got {height}x{width}"
        )));
    }
    if (height, width) == (image.height(), image.width()) {
        return Ok(image.clone());
    }

    let horizontal = resample_axis(&image.to_working(), Axis(1), width, filter);
    let resized = resample_axis(&horizontal, Axis(0), height, filter);
    Ok(ImageMatrix::from_working(&resized.mapv(f32::round)))
}

/// Scale both dimensions by `factor` with Lanczos-3 resampling.
///
/// The target size is `floor(w * factor) x floor(h * factor)`.
pub fn zoom(image: &ImageMatrix, factor: f64) -> EngineResult<ImageMatrix> {
    let factor = ensure_finite("zoom factor", factor)?;
    if factor <= 0.0 {
        return Err(EngineError::domain(format!(
            "zoom factor must be positive, got {factor}"
        )));
    }

    let width = (image.width() as f64 * factor).floor() as usize;
    let height = (image.height() as f64 * factor).floor() as usize;
    if width == 0 || height == 0 {
        return Err(EngineError::domain(format!(
            "zoom factor {factor} collapses the image to {height}x{width}"
        )));
    }

    resize(image, height, width, ResampleFilter::Lanczos3)
}

// ============================================================================
// Translate
// ============================================================================

/// Shift content by `(tx, ty)` pixels (right and down are positive).
///
/// Offsets are rounded to whole pixels; the canvas size is unchanged.
/// Offsets beyond the image size leave an all-black canvas.
pub fn translate(image: &ImageMatrix, tx: f64, ty: f64) -> EngineResult<ImageMatrix> {
    let input = image.as_array();
    let (height, width, channels) = input.dim();

    let limit = height.max(width) as f64;
    let tx = ensure_finite("translation x", tx)?.round().clamp(-limit, limit) as isize;
    let ty = ensure_finite("translation y", ty)?.round().clamp(-limit, limit) as isize;
    let mut output = Array3::<u8>::zeros((height, width, channels));

    for y in 0..height {
        let sy = y as isize - ty;
        if sy < 0 || sy >= height as isize {
            continue;
        }
        for x in 0..width {
            let sx = x as isize - tx;
            if sx < 0 || sx >= width as isize {
                continue;
            }
            for c in 0..channels {
                output[[y, x, c]] = input[[sy as usize, sx as usize, c]];
            }
        }
    }

    Ok(ImageMatrix::from_array_unchecked(output))
}

// ============================================================================
// Rotate
// ============================================================================

/// Round away float noise so right angles map exactly.
#[inline]
fn snap(v: f64) -> f64 {
    (v * 1e12).round() / 1e12
}

/// Rotate counter-clockwise by `degrees` about the image centre.
///
/// The canvas grows to hold the whole rotated image. Sampling is nearest
/// neighbour and uncovered corners are black.
pub fn rotate(image: &ImageMatrix, degrees: f64) -> EngineResult<ImageMatrix> {
    let theta = ensure_finite("rotation angle", degrees)?.to_radians();
    let (cos, sin) = (snap(theta.cos()), snap(theta.sin()));

    let input = image.as_array();
    let (height, width, channels) = input.dim();
    let (w, h) = (width as f64, height as f64);

    let new_w = ((cos.abs() * w + sin.abs() * h) - 1e-9).ceil().max(1.0) as usize;
    let new_h = ((sin.abs() * w + cos.abs() * h) - 1e-9).ceil().max(1.0) as usize;
    let mut output = Array3::<u8>::zeros((new_h, new_w, channels));

    let (cx, cy) = (w / 2.0, h / 2.0);
    let (ncx, ncy) = (new_w as f64 / 2.0, new_h as f64 / 2.0);

    for oy in 0..new_h {
        let dy = oy as f64 + 0.5 - ncy;
        for ox in 0..new_w {
            let dx = ox as f64 + 0.5 - ncx;
            // Inverse mapping from output to input
            let sx = (cos * dx - sin * dy + cx).floor();
            let sy = (sin * dx + cos * dy + cy).floor();
            if sx < 0.0 || sy < 0.0 || sx >= w || sy >= h {
                continue;
            }
            for c in 0..channels {
                output[[oy, ox, c]] = input[[sy as usize, sx as usize, c]];
            }
        }
    }

    Ok(ImageMatrix::from_array_unchecked(output))
}

// ============================================================================
// Flip / Crop
// ============================================================================

/// Mirror axis for [`flip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipAxis {
    /// Left-right mirror.
    Horizontal,
    /// Top-bottom mirror.
    Vertical,
}

/// Mirror the image.
pub fn flip(image: &ImageMatrix, axis: FlipAxis) -> ImageMatrix {
    let view = image.view();
    let flipped = match axis {
        FlipAxis::Horizontal => view.slice(s![.., ..;-1, ..]).to_owned(),
        FlipAxis::Vertical => view.slice(s![..;-1, .., ..]).to_owned(),
    };
    ImageMatrix::from_array_unchecked(flipped)
}

/// Cut out the half-open rectangle `[x1, x2) x [y1, y2)`.
///
/// The rectangle must be non-empty and lie inside the image.
pub fn crop(image: &ImageMatrix, x1: usize, y1: usize, x2: usize, y2: usize) -> EngineResult<ImageMatrix> {
    if x1 >= x2 || y1 >= y2 || x2 > image.width() || y2 > image.height() {
        return Err(EngineError::domain(format!(
            "crop rectangle ({x1}, {y1})-({x2}, {y2}) is empty or outside {}x{}",
            image.width(),
            image.height()
        )));
    }
    let cropped = image.view().slice(s![y1..y2, x1..x2, ..]).to_owned();
    Ok(ImageMatrix::from_array_unchecked(cropped))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(height: usize, width: usize) -> ImageMatrix {
        ImageMatrix::from_gray_fn(height, width, |y, x| ((y * width + x) * 10 % 256) as u8).unwrap()
    }

    #[test]
    fn test_translate_shifts_and_fills_black() {
        let img = ramp(3, 3);
        let result = translate(&img, 1.0, 0.0).unwrap();
        assert_eq!(result.dim(), img.dim());
        assert_eq!(result.get(0, 0, 0), 0);
        assert_eq!(result.get(0, 1, 0), img.get(0, 0, 0));
        assert_eq!(result.get(2, 2, 0), img.get(2, 1, 0));
    }

    #[test]
    fn test_translate_out_of_view_is_black() {
        let result = translate(&ramp(3, 3), 500.0, -500.0).unwrap();
        assert!(result.as_array().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_translate_huge_offsets_are_black() {
        let img = ramp(3, 3);
        for (tx, ty) in [(0.0, -1e300), (1e300, 0.0), (-1e300, 1e300), (f64::MAX, f64::MIN)] {
            let result = translate(&img, tx, ty).unwrap();
            assert_eq!(result.dim(), img.dim());
            assert!(result.as_array().iter().all(|&v| v == 0), "({tx}, {ty})");
        }
        assert!(translate(&img, f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn test_rotate_zero_is_identity() {
        let img = ramp(4, 5);
        assert_eq!(rotate(&img, 0.0).unwrap(), img);
        assert_eq!(rotate(&img, 360.0).unwrap(), img);
    }

    #[test]
    fn test_rotate_90_is_counter_clockwise() {
        let img = ramp(2, 3);
        let result = rotate(&img, 90.0).unwrap();
        assert_eq!(result.dim(), (3, 2, 1));
        // top-right corner moves to top-left
        assert_eq!(result.get(0, 0, 0), img.get(0, 2, 0));
        assert_eq!(result.get(2, 0, 0), img.get(0, 0, 0));
        assert_eq!(result.get(2, 1, 0), img.get(1, 0, 0));
    }

    #[test]
    fn test_rotate_45_expands_canvas() {
        let img = ImageMatrix::filled(10, 10, 3, 200).unwrap();
        let result = rotate(&img, 45.0).unwrap();
        assert_eq!(result.dim(), (15, 15, 3));
        assert_eq!(result.get(0, 0, 0), 0);
        assert_eq!(result.get(7, 7, 0), 200);
    }

    #[test]
    fn test_zoom_sizes() {
        let img = ramp(10, 20);
        assert_eq!(zoom(&img, 0.5).unwrap().dim(), (5, 10, 1));
        assert_eq!(zoom(&img, 2.0).unwrap().dim(), (20, 40, 1));
        assert_eq!(zoom(&img, 1.0).unwrap(), img);
        assert!(zoom(&img, 0.01).is_err());
        assert!(zoom(&img, 0.0).is_err());
    }

    #[test]
    fn test_resize_constant_stays_constant() {
        let img = ImageMatrix::filled(6, 6, 3, 77).unwrap();
        for filter in [ResampleFilter::Nearest, ResampleFilter::Bilinear, ResampleFilter::Lanczos3] {
            let result = resize(&img, 9, 4, filter).unwrap();
            assert_eq!(result.dim(), (9, 4, 3));
            assert!(result.as_array().iter().all(|&v| v == 77), "{filter:?}");
        }
    }

    #[test]
    fn test_resize_nearest_upscale_duplicates() {
        let img = ImageMatrix::from_gray_fn(1, 2, |_, x| if x == 0 { 10 } else { 200 }).unwrap();
        let result = resize(&img, 1, 4, ResampleFilter::Nearest).unwrap();
        let row: Vec<u8> = (0..4).map(|x| result.get(0, x, 0)).collect();
        assert_eq!(row, vec![10, 10, 200, 200]);
    }

    #[test]
    fn test_flip() {
        let img = ramp(2, 3);
        let h = flip(&img, FlipAxis::Horizontal);
        assert_eq!(h.get(0, 0, 0), img.get(0, 2, 0));
        let v = flip(&img, FlipAxis::Vertical);
        assert_eq!(v.get(0, 1, 0), img.get(1, 1, 0));
        assert_eq!(flip(&h, FlipAxis::Horizontal), img);
    }

    #[test]
    fn test_crop() {
        let img = ramp(4, 4);
        let result = crop(&img, 1, 2, 3, 4).unwrap();
        assert_eq!(result.dim(), (2, 2, 1));
        assert_eq!(result.get(0, 0, 0), img.get(2, 1, 0));
        assert!(crop(&img, 2, 0, 2, 4).is_err());
        assert!(crop(&img, 0, 0, 5, 4).is_err());
    }
}
