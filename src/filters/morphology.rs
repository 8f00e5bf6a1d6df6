//! Morphology filters: Erode, Dilate, Open.
//!
//! Operate on single 8-bit planes (usually binary masks) with a 3x3 square
//! structuring element. Samples outside the plane are ignored, so the
//! border neither erodes nor dilates the content.

use ndarray::Array2;

/// Apply a 3x3 min or max filter once.
fn rank_3x3(input: &Array2<u8>, take_max: bool) -> Array2<u8> {
    let (height, width) = input.dim();
    let mut output = Array2::<u8>::zeros((height, width));

    for y in 0..height {
        let y0 = y.saturating_sub(1);
        let y1 = (y + 1).min(height - 1);
        for x in 0..width {
            let x0 = x.saturating_sub(1);
            let x1 = (x + 1).min(width - 1);

            let mut acc = if take_max { u8::MIN } else { u8::MAX };
            for sy in y0..=y1 {
                for sx in x0..=x1 {
                    let v = input[[sy, sx]];
                    acc = if take_max { acc.max(v) } else { acc.min(v) };
                }
            }
            output[[y, x]] = acc;
        }
    }

    output
}

// ============================================================================
// Erode / Dilate
// ============================================================================

/// Erode: each pixel becomes the minimum of its 3x3 neighbourhood.
///
/// # Arguments
/// * `plane` - Gray or binary plane
/// * `iterations` - Number of passes; 0 returns a copy
pub fn erode(plane: &Array2<u8>, iterations: usize) -> Array2<u8> {
    let mut current = plane.clone();
    for _ in 0..iterations {
        current = rank_3x3(&current, false);
    }
    current
}

/// Dilate: each pixel becomes the maximum of its 3x3 neighbourhood.
///
/// # Arguments
/// * `plane` - Gray or binary plane
/// * `iterations` - Number of passes; 0 returns a copy
pub fn dilate(plane: &Array2<u8>, iterations: usize) -> Array2<u8> {
    let mut current = plane.clone();
    for _ in 0..iterations {
        current = rank_3x3(&current, true);
    }
    current
}

// ============================================================================
// Open
// ============================================================================

/// Opening: `iterations` erosions followed by as many dilations.
///
/// Removes bright specks smaller than the structuring element.
pub fn open(plane: &Array2<u8>, iterations: usize) -> Array2<u8> {
    dilate(&erode(plane, iterations), iterations)
}
