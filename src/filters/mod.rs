//! Spatial-domain and pointwise image operations.
//!
//! ## Supported Formats
//!
//! Every filter takes an [`ImageMatrix`](crate::image::ImageMatrix) with
//! 1 or 3 channels:
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | Grayscale8 | (H, W, 1) | u8 | Single luminance channel, 0-255 |
//! | RGB8 | (H, W, 3) | u8 | Red, green, blue, 0-255 |
//!
//! Arithmetic runs on an `f32` working copy on the same 0-255 scale and is
//! clipped once on the way back.
//!
//! ## Architecture
//!
//! All filters follow these principles:
//! - **Pure** - Input is borrowed, a new image is returned
//! - **Validated** - Parameters are checked before any pixel work; a bad
//!   value returns [`EngineError::Domain`](crate::error::EngineError)
//! - **Grayscale handling** - Luminance-based operators (edges, threshold,
//!   boolean) convert color input with BT.601 weights and return one channel
//! - **Reflect borders** - Convolution mirrors about the edge pixel
//!   (`dcb|abcd|cba`)
//!
//! ## Filter Categories
//!
//! - **Pixel-wise**: arithmetic, negative, brightness, contrast
//! - **Boolean**: not, and, or, xor
//! - **Tonal**: threshold, histogram equalization, Otsu
//! - **Color science**: grayscale, HSV, CMY, YUV, YIQ, pseudocolor
//! - **Smoothing**: mean, median, gaussian
//! - **Sharpening**: highpass, highboost, convolution
//! - **Edge detection**: sobel, prewitt, roberts, laplacian, LoG, compass, canny
//! - **Noise**: gaussian, rayleigh, erlang, exponential, uniform, impulse
//! - **Morphology**: erode, dilate, open (binary planes)
//! - **Geometry**: resize, zoom, translate, rotate, flip, crop

pub mod core;

pub mod grayscale;
pub mod color_adjust;
pub mod color_science;
pub mod levels_curves;
pub mod boolean;

pub mod blur;
pub mod sharpen;
pub mod edge;
pub mod canny;

pub mod noise;
pub mod morphology;
pub mod geometry;
