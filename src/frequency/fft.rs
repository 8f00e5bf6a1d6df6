//! Centered 2D Fourier transform of a grayscale image.
//!
//! The forward transform runs a row pass then a column pass with
//! `rustfft`, and stores the result with the zero-frequency bin moved to
//! `(rows / 2, cols / 2)`. The inverse undoes the shift, transforms back,
//! normalizes by `rows * cols` and keeps the magnitude of each sample.

use ndarray::{Array2, Axis, Zip};
use rustfft::num_complex::Complex;
use rustfft::{FftDirection, FftPlanner};

use super::mask::FrequencyMask;
use crate::error::{EngineError, EngineResult};
use crate::image::ImageMatrix;

/// Centered complex spectrum of a grayscale image.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    bins: Array2<Complex<f64>>,
}

impl Spectrum {
    /// `(rows, cols)`
    pub fn dim(&self) -> (usize, usize) {
        self.bins.dim()
    }

    /// Complex bins, zero frequency at `(rows / 2, cols / 2)`.
    pub fn bins(&self) -> &Array2<Complex<f64>> {
        &self.bins
    }

    /// Multiply every bin by the matching mask weight.
    pub fn apply_mask(&self, mask: &FrequencyMask) -> EngineResult<Spectrum> {
        if mask.dim() != self.dim() {
            let (r, c) = self.dim();
            let (mr, mc) = mask.dim();
            return Err(EngineError::DimensionMismatch(format!(
                "spectrum {r}x{c} vs mask {mr}x{mc}"
            )));
        }
        let bins = Zip::from(&self.bins)
            .and(mask.weights())
            .map_collect(|&z, &w| z * w);
        Ok(Spectrum { bins })
    }

    /// Log-magnitude display image: `20 * ln(|F| + 1)`, clipped.
    pub fn magnitude_image(&self) -> ImageMatrix {
        let plane = self
            .bins
            .mapv(|z| (20.0 * (z.norm() + 1.0).ln()) as f32);
        ImageMatrix::from_gray_working(&plane)
    }
}

// ============================================================================
// Transforms
// ============================================================================

/// Forward transform of the image's luminance, centered.
pub fn fourier_forward(image: &ImageMatrix) -> Spectrum {
    let plane = image.gray_plane();
    let mut bins = plane.mapv(|v| Complex::new(f64::from(v), 0.0));
    fft_2d(&mut bins, FftDirection::Forward);
    Spectrum {
        bins: roll(&bins, true),
    }
}

/// Inverse transform keeping the magnitude of the result, clipped to 8 bits.
pub fn fourier_inverse(spectrum: &Spectrum) -> ImageMatrix {
    let (rows, cols) = spectrum.dim();
    let mut bins = roll(&spectrum.bins, false);
    fft_2d(&mut bins, FftDirection::Inverse);

    let scale = 1.0 / (rows * cols) as f64;
    let plane = bins.mapv(|z| (z.norm() * scale) as f32);
    ImageMatrix::from_gray_working(&plane)
}

/// In-place 2D FFT: rows, then columns. Unnormalized.
fn fft_2d(data: &mut Array2<Complex<f64>>, direction: FftDirection) {
    let (rows, cols) = data.dim();
    let mut planner = FftPlanner::<f64>::new();

    let row_fft = planner.plan_fft(cols, direction);
    let mut buf = vec![Complex::new(0.0, 0.0); cols.max(rows)];
    for mut row in data.axis_iter_mut(Axis(0)) {
        let line = &mut buf[..cols];
        for (dst, src) in line.iter_mut().zip(row.iter()) {
            *dst = *src;
        }
        row_fft.process(line);
        for (dst, src) in row.iter_mut().zip(line.iter()) {
            *dst = *src;
        }
    }

    let col_fft = planner.plan_fft(rows, direction);
    for mut col in data.axis_iter_mut(Axis(1)) {
        let line = &mut buf[..rows];
        for (dst, src) in line.iter_mut().zip(col.iter()) {
            *dst = *src;
        }
        col_fft.process(line);
        for (dst, src) in col.iter_mut().zip(line.iter()) {
            *dst = *src;
        }
    }
}

/// Circular shift by half the size on both axes.
///
/// `forward` moves bin 0 to the centre (fftshift); otherwise the centre
/// goes back to 0 (ifftshift). The two differ only for odd sizes.
fn roll(data: &Array2<Complex<f64>>, forward: bool) -> Array2<Complex<f64>> {
    let (rows, cols) = data.dim();
    let (sr, sc) = if forward {
        (rows - rows / 2, cols - cols / 2)
    } else {
        (rows / 2, cols / 2)
    };
    Array2::from_shape_fn((rows, cols), |(y, x)| {
        data[[(y + sr) % rows, (x + sc) % cols]]
    })
}

/// Centre of the shifted spectrum, reused by mask construction.
#[inline]
pub(crate) fn center(rows: usize, cols: usize) -> (f64, f64) {
    ((rows / 2) as f64, (cols / 2) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample(height: usize, width: usize) -> ImageMatrix {
        ImageMatrix::from_gray_fn(height, width, |y, x| ((y * 37 + x * 11 + 5) % 250) as u8).unwrap()
    }

    fn max_diff(a: &ImageMatrix, b: &ImageMatrix) -> i32 {
        a.as_array()
            .iter()
            .zip(b.as_array().iter())
            .map(|(&p, &q)| (p as i32 - q as i32).abs())
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_round_trip_even_and_odd() {
        for (h, w) in [(8, 8), (7, 9), (5, 12)] {
            let img = sample(h, w);
            let back = fourier_inverse(&fourier_forward(&img));
            assert_eq!(back.dim(), img.dim());
            assert!(max_diff(&back, &img) <= 1, "{h}x{w}");
        }
    }

    #[test]
    fn test_dc_is_centered() {
        let img = ImageMatrix::filled(6, 5, 1, 10).unwrap();
        let spectrum = fourier_forward(&img);
        let (cy, cx) = (3, 2);
        assert_abs_diff_eq!(spectrum.bins()[[cy, cx]].re, 300.0, epsilon = 1e-9);
        let others: f64 = spectrum
            .bins()
            .indexed_iter()
            .filter(|&((y, x), _)| (y, x) != (cy, cx))
            .map(|(_, z)| z.norm())
            .sum();
        assert_abs_diff_eq!(others, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_roll_inverts() {
        let data = Array2::from_shape_fn((5, 4), |(y, x)| Complex::new((y * 4 + x) as f64, 0.0));
        assert_eq!(roll(&roll(&data, true), false), data);
        assert_eq!(roll(&data, true)[[2, 2]], data[[0, 0]]);
    }

    #[test]
    fn test_magnitude_image_of_flat_image() {
        let img = ImageMatrix::filled(4, 4, 1, 1).unwrap();
        let display = fourier_forward(&img).magnitude_image();
        // 20 * ln(17) = 56.7 at DC, 0 elsewhere
        assert_eq!(display.get(2, 2, 0), 56);
        assert_eq!(display.get(0, 0, 0), 0);
    }
}
