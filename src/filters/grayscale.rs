//! Grayscale conversion.
//!
//! Uses ITU-R BT.601 luminance weights, the weighting applied when a
//! color image is read as a single luminance channel.
//!
//! ## Channel Handling
//!
//! - **Grayscale**: (height, width, 1) - returned unchanged
//! - **RGB**: (height, width, 3) - reduced to one luminance channel
//!
//! Every grayscale-only operation in the engine (boolean ops, edge
//! detection, frequency filtering, segmentation) converts through here.

use ndarray::{Array2, ArrayView3};

use crate::image::ImageMatrix;

/// ITU-R BT.601 luminance coefficients
pub const LUMA_R: f32 = 0.299;
pub const LUMA_G: f32 = 0.587;
pub const LUMA_B: f32 = 0.114;

/// Luminance of one RGB sample, rounded to the nearest integer.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let y = LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32;
    y.round().clamp(0.0, 255.0) as u8
}

/// Compute the luminance plane of an RGB array.
///
/// # Arguments
/// * `input` - 3D array view of shape (height, width, 3)
///
/// # Returns
/// (height, width) luminance plane
pub fn luminance_plane(input: ArrayView3<u8>) -> Array2<u8> {
    let (height, width, _) = input.dim();
    let mut output = Array2::<u8>::zeros((height, width));

    for y in 0..height {
        for x in 0..width {
            output[[y, x]] = luminance(input[[y, x, 0]], input[[y, x, 1]], input[[y, x, 2]]);
        }
    }

    output
}

/// Convert an image to single-channel grayscale.
pub fn to_grayscale(image: &ImageMatrix) -> ImageMatrix {
    image.to_gray()
}

/// Convert an image to 3-channel RGB (grayscale is replicated).
pub fn to_rgb(image: &ImageMatrix) -> ImageMatrix {
    image.to_rgb()
}
