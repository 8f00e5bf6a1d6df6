//! Catalog of menu operations.
//!
//! Every operation is a pure function `(original, value) -> candidate`.
//! Adjustable operations carry a [`ParamRange`]; one-shot operations
//! ignore the value. Two-image boolean operations need a second buffer
//! and go through [`EngineState::combine`](crate::session::EngineState::combine)
//! instead.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::EngineResult;
use crate::filters::color_adjust::{self, ArithmeticOp};
use crate::filters::geometry::{self, FlipAxis};
use crate::filters::noise::{self, NoiseKind};
use crate::filters::{blur, boolean, canny, color_science, edge, grayscale, levels_curves, sharpen};
use crate::frequency::{self, MaskKind};
use crate::image::ImageMatrix;
use crate::params::{self, ParamRange};
use crate::segmentation;

/// One menu entry of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    // Basic
    Negative,
    Add,
    Subtract,
    Multiply,
    Divide,
    BooleanNot,
    TranslateX,
    TranslateY,
    Rotation,
    Zoom,
    FlipHorizontal,
    FlipVertical,
    Threshold,
    Convolution,
    FourierTransform,
    // Colouring
    Binary,
    Grayscale,
    Rgb,
    Hsv,
    Cmy,
    Yuv,
    Yiq,
    Pseudocolor,
    // Enhancement
    Brightness,
    Contrast,
    HistogramEqualization,
    LowpassFilter,
    MedianFilter,
    Ilpf,
    Blpf,
    HighpassFilter,
    HighboostFilter,
    Ihpf,
    Bhpf,
    // Noise
    GaussianNoise,
    RayleighNoise,
    ErlangNoise,
    ExponentialNoise,
    UniformNoise,
    ImpulseNoise,
    // Edge detection
    Sobel,
    Prewitt,
    Roberts,
    Laplacian,
    LaplacianOfGaussian,
    Canny,
    Compass,
    // Segmentation
    RegionGrowing,
    Watershed,
}

/// Odd window from a slider value: truncate, then bump even sizes up.
fn window_size(value: f64) -> usize {
    let w = value.max(0.0) as usize;
    if w % 2 == 0 {
        w + 1
    } else {
        w
    }
}

impl Operation {
    pub const ALL: [Operation; 49] = [
        Operation::Negative,
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
        Operation::BooleanNot,
        Operation::TranslateX,
        Operation::TranslateY,
        Operation::Rotation,
        Operation::Zoom,
        Operation::FlipHorizontal,
        Operation::FlipVertical,
        Operation::Threshold,
        Operation::Convolution,
        Operation::FourierTransform,
        Operation::Binary,
        Operation::Grayscale,
        Operation::Rgb,
        Operation::Hsv,
        Operation::Cmy,
        Operation::Yuv,
        Operation::Yiq,
        Operation::Pseudocolor,
        Operation::Brightness,
        Operation::Contrast,
        Operation::HistogramEqualization,
        Operation::LowpassFilter,
        Operation::MedianFilter,
        Operation::Ilpf,
        Operation::Blpf,
        Operation::HighpassFilter,
        Operation::HighboostFilter,
        Operation::Ihpf,
        Operation::Bhpf,
        Operation::GaussianNoise,
        Operation::RayleighNoise,
        Operation::ErlangNoise,
        Operation::ExponentialNoise,
        Operation::UniformNoise,
        Operation::ImpulseNoise,
        Operation::Sobel,
        Operation::Prewitt,
        Operation::Roberts,
        Operation::Laplacian,
        Operation::LaplacianOfGaussian,
        Operation::Canny,
        Operation::Compass,
        Operation::RegionGrowing,
        Operation::Watershed,
    ];

    /// Menu label.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Negative => "Negative",
            Operation::Add => "Add",
            Operation::Subtract => "Subtract",
            Operation::Multiply => "Multiply",
            Operation::Divide => "Divide",
            Operation::BooleanNot => "NOT",
            Operation::TranslateX => "Translation X",
            Operation::TranslateY => "Translation Y",
            Operation::Rotation => "Rotation",
            Operation::Zoom => "Zooming",
            Operation::FlipHorizontal => "Flip Horizontal",
            Operation::FlipVertical => "Flip Vertical",
            Operation::Threshold => "Thresholding",
            Operation::Convolution => "Convolution",
            Operation::FourierTransform => "Fourier Transform",
            Operation::Binary => "Binary",
            Operation::Grayscale => "Grayscale",
            Operation::Rgb => "RGB",
            Operation::Hsv => "HSV",
            Operation::Cmy => "CMY",
            Operation::Yuv => "YUV",
            Operation::Yiq => "YIQ",
            Operation::Pseudocolor => "Pseudo",
            Operation::Brightness => "Brightness",
            Operation::Contrast => "Contrast",
            Operation::HistogramEqualization => "Hist. Equalization",
            Operation::LowpassFilter => "Lowpass Filtering",
            Operation::MedianFilter => "Median Filtering",
            Operation::Ilpf => "ILPF",
            Operation::Blpf => "BLPF",
            Operation::HighpassFilter => "Highpass Filtering",
            Operation::HighboostFilter => "Highboost Filtering",
            Operation::Ihpf => "IHPF",
            Operation::Bhpf => "BHPF",
            Operation::GaussianNoise => "Gaussian Noise",
            Operation::RayleighNoise => "Rayleigh Noise",
            Operation::ErlangNoise => "Erlang (Gamma) Noise",
            Operation::ExponentialNoise => "Exponential Noise",
            Operation::UniformNoise => "Uniform Noise",
            Operation::ImpulseNoise => "Impulse Noise",
            Operation::Sobel => "Sobel",
            Operation::Prewitt => "Prewitt",
            Operation::Roberts => "Robert",
            Operation::Laplacian => "Laplacian",
            Operation::LaplacianOfGaussian => "Laplacian of Gaussian (LoG)",
            Operation::Canny => "Canny",
            Operation::Compass => "Compass",
            Operation::RegionGrowing => "Region Growing",
            Operation::Watershed => "Watershed",
        }
    }

    /// Look up an operation by its menu label.
    pub fn from_name(name: &str) -> Option<Operation> {
        Operation::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Slider range, or `None` for one-shot operations.
    pub fn range(&self) -> Option<ParamRange> {
        let range = match self {
            Operation::Negative => params::NEGATIVE,
            Operation::Add | Operation::Subtract => params::ADD_SUBTRACT,
            Operation::Multiply | Operation::Divide => params::MULTIPLY_DIVIDE,
            Operation::BooleanNot => params::BOOLEAN_NOT,
            Operation::TranslateX | Operation::TranslateY => params::TRANSLATE,
            Operation::Rotation => params::ROTATION,
            Operation::Zoom => params::ZOOM,
            Operation::Threshold | Operation::Binary => params::THRESHOLD,
            Operation::Brightness => params::BRIGHTNESS,
            Operation::Contrast => params::CONTRAST,
            Operation::LowpassFilter | Operation::MedianFilter => params::SMOOTHING_WINDOW,
            Operation::Ilpf | Operation::Blpf | Operation::Ihpf | Operation::Bhpf => params::CUTOFF,
            Operation::HighpassFilter => params::HIGHPASS,
            Operation::HighboostFilter => params::HIGHBOOST,
            Operation::GaussianNoise => params::GAUSSIAN_NOISE,
            Operation::RayleighNoise => params::RAYLEIGH_NOISE,
            Operation::ErlangNoise => params::ERLANG_NOISE,
            Operation::ExponentialNoise => params::EXPONENTIAL_NOISE,
            Operation::UniformNoise => params::UNIFORM_NOISE,
            Operation::ImpulseNoise => params::IMPULSE_NOISE,
            Operation::LaplacianOfGaussian => params::LOG_WINDOW,
            Operation::Canny => params::CANNY_LOW,
            Operation::RegionGrowing => params::REGION_THRESHOLD,
            _ => return None,
        };
        Some(range)
    }

    /// True if the operation draws random samples.
    pub fn is_stochastic(&self) -> bool {
        matches!(
            self,
            Operation::GaussianNoise
                | Operation::RayleighNoise
                | Operation::ErlangNoise
                | Operation::ExponentialNoise
                | Operation::UniformNoise
                | Operation::ImpulseNoise
        )
    }

    /// Apply with the thread-local random source.
    pub fn apply(&self, image: &ImageMatrix, value: f64) -> EngineResult<ImageMatrix> {
        self.apply_with_rng(image, value, &mut rand::rng())
    }

    /// Apply the operation to `image`.
    ///
    /// `value` is checked against [`Operation::range`] first; one-shot
    /// operations ignore it. `rng` is only drawn from by noise operations.
    pub fn apply_with_rng<R: Rng + ?Sized>(
        &self,
        image: &ImageMatrix,
        value: f64,
        rng: &mut R,
    ) -> EngineResult<ImageMatrix> {
        let v = match self.range() {
            Some(range) => range.check(self.name(), value)?,
            None => value,
        };
        trace!(operation = self.name(), value = v, "dispatch");

        match self {
            Operation::Negative => color_adjust::negative(image, v),
            Operation::Add => color_adjust::arithmetic(image, ArithmeticOp::Add, v),
            Operation::Subtract => color_adjust::arithmetic(image, ArithmeticOp::Subtract, v),
            Operation::Multiply => color_adjust::arithmetic(image, ArithmeticOp::Multiply, v),
            Operation::Divide => color_adjust::arithmetic(image, ArithmeticOp::Divide, v),
            Operation::BooleanNot => boolean::boolean_not(image, v),
            Operation::TranslateX => geometry::translate(image, v, 0.0),
            Operation::TranslateY => geometry::translate(image, 0.0, v),
            Operation::Rotation => geometry::rotate(image, v),
            Operation::Zoom => geometry::zoom(image, v),
            Operation::FlipHorizontal => Ok(geometry::flip(image, FlipAxis::Horizontal)),
            Operation::FlipVertical => Ok(geometry::flip(image, FlipAxis::Vertical)),
            Operation::Threshold | Operation::Binary => levels_curves::threshold(image, v),
            Operation::Convolution => sharpen::convolution(image),
            Operation::FourierTransform => Ok(frequency::magnitude_spectrum(image)),
            Operation::Grayscale => Ok(grayscale::to_grayscale(image)),
            Operation::Rgb => Ok(grayscale::to_rgb(image)),
            Operation::Hsv => Ok(color_science::to_hsv(image)),
            Operation::Cmy => Ok(color_science::to_cmy(image)),
            Operation::Yuv => Ok(color_science::to_yuv(image)),
            Operation::Yiq => Ok(color_science::to_yiq(image)),
            Operation::Pseudocolor => Ok(color_science::pseudocolor(image)),
            Operation::Brightness => color_adjust::brightness(image, v),
            Operation::Contrast => color_adjust::contrast(image, v),
            Operation::HistogramEqualization => Ok(levels_curves::equalize_histogram(image)),
            Operation::LowpassFilter => blur::mean_filter(image, window_size(v)),
            Operation::MedianFilter => blur::median_filter(image, window_size(v)),
            Operation::Ilpf => frequency::frequency_filter(image, MaskKind::IdealLowpass, v),
            Operation::Blpf => frequency::frequency_filter(image, MaskKind::ButterworthLowpass, v),
            Operation::Ihpf => frequency::frequency_filter(image, MaskKind::IdealHighpass, v),
            Operation::Bhpf => frequency::frequency_filter(image, MaskKind::ButterworthHighpass, v),
            Operation::HighpassFilter => sharpen::highpass(image, v),
            Operation::HighboostFilter => sharpen::highboost(image, v),
            Operation::GaussianNoise => noise::add_noise(image, NoiseKind::Gaussian, v, rng),
            Operation::RayleighNoise => noise::add_noise(image, NoiseKind::Rayleigh, v, rng),
            Operation::ErlangNoise => noise::add_noise(image, NoiseKind::Erlang, v, rng),
            Operation::ExponentialNoise => noise::add_noise(image, NoiseKind::Exponential, v, rng),
            Operation::UniformNoise => noise::add_noise(image, NoiseKind::Uniform, v, rng),
            Operation::ImpulseNoise => noise::salt_and_pepper(image, v, rng),
            Operation::Sobel => edge::sobel(image),
            Operation::Prewitt => edge::prewitt(image),
            Operation::Roberts => edge::roberts(image),
            Operation::Laplacian => edge::laplacian(image),
            Operation::LaplacianOfGaussian => edge::laplacian_of_gaussian(image, window_size(v)),
            Operation::Canny => canny::canny(image, v),
            Operation::Compass => edge::compass(image),
            Operation::RegionGrowing => segmentation::region_growing(image, None, v),
            Operation::Watershed => Ok(segmentation::watershed(image)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn sample() -> ImageMatrix {
        let raw = (0..8 * 9 * 3).map(|i| ((i * 37) % 256) as u8).collect();
        ImageMatrix::from_raw(8, 9, 3, raw).unwrap()
    }

    #[test]
    fn test_catalog_is_complete_and_unique() {
        let names: HashSet<_> = Operation::ALL.iter().map(|op| op.name()).collect();
        assert_eq!(names.len(), Operation::ALL.len());
        for op in Operation::ALL {
            assert_eq!(Operation::from_name(op.name()), Some(op));
        }
        assert_eq!(Operation::from_name("Emboss"), None);
    }

    #[test]
    fn test_every_operation_runs_at_default() {
        let img = sample();
        let mut rng = StdRng::seed_from_u64(5);
        for op in Operation::ALL {
            let value = op.range().map_or(0.0, |r| r.default);
            let result = op.apply_with_rng(&img, value, &mut rng);
            assert!(result.is_ok(), "{}: {:?}", op.name(), result.err());
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        let img = sample();
        assert!(Operation::Divide.apply(&img, 0.0).is_err());
        assert!(Operation::ImpulseNoise.apply(&img, 0.6).is_err());
        assert!(Operation::Ilpf.apply(&img, 0.0).is_err());
        assert!(Operation::Brightness.apply(&img, f64::NAN).is_err());
    }

    #[test]
    fn test_window_size_is_odd() {
        assert_eq!(window_size(4.0), 5);
        assert_eq!(window_size(5.9), 5);
        assert_eq!(window_size(0.0), 1);
    }

    #[test]
    fn test_identity_parameters() {
        let img = sample();
        for (op, value) in [
            (Operation::Multiply, 1.0),
            (Operation::Add, 0.0),
            (Operation::Negative, 0.0),
            (Operation::Brightness, 1.0),
            (Operation::Rotation, 0.0),
            (Operation::Zoom, 1.0),
        ] {
            assert_eq!(op.apply(&img, value).unwrap(), img, "{}", op.name());
        }
    }

    #[test]
    fn test_one_shot_ignores_value() {
        let img = sample();
        let a = Operation::Sobel.apply(&img, 0.0).unwrap();
        let b = Operation::Sobel.apply(&img, 1e9).unwrap();
        assert_eq!(a, b);
        assert!(Operation::Sobel.range().is_none());
    }
}
