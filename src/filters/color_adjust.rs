//! Pointwise adjustments: Arithmetic, Negative, Brightness, Contrast.
//!
//! These are pixel-wise operations that don't require spatial context.
//! Each one reads the untouched original, works in floating point on the
//! 0-255 scale and clips once when converting back to 8 bits.
//!
//! ## Supported Formats
//!
//! All adjustments accept grayscale (H, W, 1) and RGB (H, W, 3) images and
//! return the same channel count.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_range, EngineError, EngineResult};
use crate::image::ImageMatrix;

// ============================================================================
// Arithmetic
// ============================================================================

/// Arithmetic operator applied between every sample and a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    #[inline]
    fn apply(self, v: f32, k: f32) -> f32 {
        match self {
            ArithmeticOp::Add => v + k,
            ArithmeticOp::Subtract => v - k,
            ArithmeticOp::Multiply => v * k,
            ArithmeticOp::Divide => v / k,
        }
    }
}

/// Combine every sample with a scalar: `clip(image ∘ k, 0, 255)`.
///
/// # Arguments
/// * `image` - Grayscale or RGB image
/// * `op` - Operator to apply
/// * `k` - Scalar operand; must be finite, and non-zero for `Divide`
///
/// # Returns
/// New image with the same channel count
pub fn arithmetic(image: &ImageMatrix, op: ArithmeticOp, k: f64) -> EngineResult<ImageMatrix> {
    ensure_finite("arithmetic operand", k)?;
    if op == ArithmeticOp::Divide && k == 0.0 {
        return Err(EngineError::domain("divide factor must be non-zero"));
    }

    let k = k as f32;
    let working = image.to_working().mapv(|v| op.apply(v, k));
    Ok(ImageMatrix::from_working(&working))
}

// ============================================================================
// Negative
// ============================================================================

/// Strength-interpolated negative.
///
/// Blends linearly between the image and its inversion `255 - v`:
/// `v + s * ((255 - v) - v)`. `s = 0` is the identity, `s = 1` the full
/// negative.
///
/// # Arguments
/// * `image` - Grayscale or RGB image
/// * `strength` - Blend factor in [0, 1]
pub fn negative(image: &ImageMatrix, strength: f64) -> EngineResult<ImageMatrix> {
    let s = ensure_range("negative strength", strength, 0.0, 1.0)? as f32;
    let working = image.to_working().mapv(|v| v + s * ((255.0 - v) - v));
    Ok(ImageMatrix::from_working(&working))
}

// ============================================================================
// Brightness
// ============================================================================

/// Scale brightness by `factor` (blend towards black below 1.0).
///
/// # Arguments
/// * `image` - Grayscale or RGB image
/// * `factor` - Brightness factor, `>= 0`; 1.0 = no change
pub fn brightness(image: &ImageMatrix, factor: f64) -> EngineResult<ImageMatrix> {
    let factor = ensure_finite("brightness factor", factor)?;
    if factor < 0.0 {
        return Err(EngineError::domain(format!(
            "brightness factor must be non-negative, got {factor}"
        )));
    }

    let factor = factor as f32;
    let working = image.to_working().mapv(|v| v * factor);
    Ok(ImageMatrix::from_working(&working))
}

// ============================================================================
// Contrast
// ============================================================================

/// Scale contrast about the mean gray level.
///
/// `mean + factor * (v - mean)`, where `mean` is the rounded average of
/// the image's luminance.
///
/// # Arguments
/// * `image` - Grayscale or RGB image
/// * `factor` - Contrast factor, `>= 0`; 1.0 = no change, 0.0 = flat gray
pub fn contrast(image: &ImageMatrix, factor: f64) -> EngineResult<ImageMatrix> {
    let factor = ensure_finite("contrast factor", factor)?;
    if factor < 0.0 {
        return Err(EngineError::domain(format!(
            "contrast factor must be non-negative, got {factor}"
        )));
    }

    let mean = mean_luminance(image);
    let factor = factor as f32;
    let working = image.to_working().mapv(|v| mean + factor * (v - mean));
    Ok(ImageMatrix::from_working(&working))
}

/// Average luminance rounded to the nearest gray level.
fn mean_luminance(image: &ImageMatrix) -> f32 {
    let gray = image.gray_plane();
    let total: u64 = gray.iter().map(|&v| v as u64).sum();
    let mean = total as f64 / gray.len() as f64;
    (mean + 0.5).floor() as f32
}
