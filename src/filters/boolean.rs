//! Boolean operations: NOT, AND, OR, XOR.
//!
//! Both operands are reduced to grayscale and combined bitwise per pixel.
//! NOT is the strength-interpolated negative on the luminance plane, so it
//! can be previewed like any other slider operation.

use ndarray::Zip;
use serde::{Deserialize, Serialize};

use super::geometry::{resize, ResampleFilter};
use crate::error::{ensure_range, EngineError, EngineResult};
use crate::image::ImageMatrix;

/// Bitwise operator for two-image combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOp {
    And,
    Or,
    Xor,
}

impl BooleanOp {
    #[inline]
    fn apply(self, a: u8, b: u8) -> u8 {
        match self {
            BooleanOp::And => a & b,
            BooleanOp::Or => a | b,
            BooleanOp::Xor => a ^ b,
        }
    }
}

// ============================================================================
// NOT
// ============================================================================

/// Strength-interpolated NOT on the luminance plane.
///
/// # Arguments
/// * `image` - Grayscale or RGB image
/// * `strength` - Blend in [0, 1]; 1 is the full complement `255 - v`
pub fn boolean_not(image: &ImageMatrix, strength: f64) -> EngineResult<ImageMatrix> {
    let s = ensure_range("NOT strength", strength, 0.0, 1.0)? as f32;
    let gray = image.gray_working();
    let blended = gray.mapv(|v| v + s * ((255.0 - v) - v));
    Ok(ImageMatrix::from_gray_working(&blended))
}

// ============================================================================
// AND / OR / XOR
// ============================================================================

/// Combine two images bitwise.
///
/// # Arguments
/// * `first` - Image that fixes the output size
/// * `second` - Other operand
/// * `op` - Bitwise operator
/// * `resample` - Bilinearly resize `second` to `first`'s size when they
///   differ; without it a size difference is an error
///
/// # Returns
/// Single-channel image of `first`'s size
pub fn boolean_combine(
    first: &ImageMatrix,
    second: &ImageMatrix,
    op: BooleanOp,
    resample: bool,
) -> EngineResult<ImageMatrix> {
    let resized;
    let second = if first.same_size(second) {
        second
    } else if resample {
        resized = resize(second, first.height(), first.width(), ResampleFilter::Bilinear)?;
        &resized
    } else {
        return Err(EngineError::DimensionMismatch(format!(
            "{}x{} vs {}x{}",
            first.height(),
            first.width(),
            second.height(),
            second.width()
        )));
    };

    let a = first.gray_plane();
    let b = second.gray_plane();
    let combined = Zip::from(&a).and(&b).map_collect(|&x, &y| op.apply(x, y));
    ImageMatrix::from_gray(combined)
}

/// Bitwise AND, resampling the second operand if needed.
pub fn boolean_and(first: &ImageMatrix, second: &ImageMatrix) -> EngineResult<ImageMatrix> {
    boolean_combine(first, second, BooleanOp::And, true)
}

/// Bitwise OR, resampling the second operand if needed.
pub fn boolean_or(first: &ImageMatrix, second: &ImageMatrix) -> EngineResult<ImageMatrix> {
    boolean_combine(first, second, BooleanOp::Or, true)
}

/// Bitwise XOR, resampling the second operand if needed.
pub fn boolean_xor(first: &ImageMatrix, second: &ImageMatrix) -> EngineResult<ImageMatrix> {
    boolean_combine(first, second, BooleanOp::Xor, true)
}
