//! Frequency-domain filtering.
//!
//! - **Transform** (`fft.rs`): centered forward/inverse 2D FFT
//! - **Masks** (`mask.rs`): ideal and Butterworth lowpass/highpass
//!
//! Filters work on the luminance plane and return a single-channel image.

pub mod fft;
pub mod mask;

pub use fft::{fourier_forward, fourier_inverse, Spectrum};
pub use mask::{FrequencyMask, MaskKind};

use tracing::debug;

use crate::error::EngineResult;
use crate::image::ImageMatrix;

/// Filter the image in the frequency domain.
///
/// Transforms the luminance plane, multiplies by the `kind` mask with
/// radius `cutoff`, transforms back and keeps the magnitude.
///
/// # Arguments
/// * `image` - Grayscale or RGB image
/// * `kind` - Mask family
/// * `cutoff` - Cutoff radius in bins (see [`FrequencyMask::build`])
pub fn frequency_filter(image: &ImageMatrix, kind: MaskKind, cutoff: f64) -> EngineResult<ImageMatrix> {
    let (rows, cols) = (image.height(), image.width());
    // Validate before transforming
    let mask = FrequencyMask::build(kind, rows, cols, cutoff)?;
    debug!(?kind, cutoff, rows, cols, "frequency filter");

    let filtered = fourier_forward(image).apply_mask(&mask)?;
    Ok(fourier_inverse(&filtered))
}

/// Log-magnitude spectrum of the luminance plane, DC at the centre.
pub fn magnitude_spectrum(image: &ImageMatrix) -> ImageMatrix {
    debug!(rows = image.height(), cols = image.width(), "magnitude spectrum");
    fourier_forward(image).magnitude_image()
}
