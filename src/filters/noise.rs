//! Noise synthesis: additive distributions and impulse (salt-and-pepper).
//!
//! Every sample of every channel receives an independent draw, then the
//! result is clipped to [0, 255]. All generators take the random source as
//! a parameter; the `_seeded` variants wrap a `StdRng` for reproducible
//! output.
//!
//! ## Supported Formats
//!
//! All generators accept grayscale (H, W, 1) and RGB (H, W, 3) images and
//! return the same channel count.

use rand::distr::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Gamma, Normal, Weibull};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ensure_finite, ensure_range, EngineError, EngineResult};
use crate::image::ImageMatrix;

/// Gamma shape used for Erlang noise.
const ERLANG_SHAPE: f64 = 2.0;

/// Additive noise distribution, each with a single scale parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoiseKind {
    /// Zero-mean normal, scale = standard deviation.
    Gaussian,
    /// Rayleigh, scale = mode σ.
    Rayleigh,
    /// Gamma with shape 2, scale = θ.
    Erlang,
    /// Exponential, scale = mean θ.
    Exponential,
    /// Uniform on `[-a, a)`, scale = a.
    Uniform,
}

fn distribution_error(kind: NoiseKind, e: impl std::fmt::Display) -> EngineError {
    EngineError::domain(format!("invalid {kind:?} noise parameters: {e}"))
}

/// Add one independent draw from `dist` to every sample.
fn add_sampled<D, R>(image: &ImageMatrix, dist: &D, rng: &mut R) -> ImageMatrix
where
    D: Distribution<f64>,
    R: Rng + ?Sized,
{
    let mut working = image.to_working();
    working.mapv_inplace(|v| (v as f64 + dist.sample(rng)) as f32);
    ImageMatrix::from_working(&working)
}

// ============================================================================
// Additive Noise
// ============================================================================

/// Add noise drawn from `kind` with the given scale.
///
/// # Arguments
/// * `image` - Grayscale or RGB image
/// * `kind` - Noise distribution
/// * `scale` - Distribution scale, `>= 0`; 0 returns an exact copy
/// * `rng` - Random source
///
/// # Returns
/// Noisy image with the same channel count
pub fn add_noise<R: Rng + ?Sized>(
    image: &ImageMatrix,
    kind: NoiseKind,
    scale: f64,
    rng: &mut R,
) -> EngineResult<ImageMatrix> {
    let scale = ensure_finite("noise scale", scale)?;
    if scale < 0.0 {
        return Err(EngineError::domain(format!(
            "noise scale must be non-negative, got {scale}"
        )));
    }
    if scale == 0.0 {
        return Ok(image.clone());
    }
    trace!(?kind, scale, "additive noise");

    let noisy = match kind {
        NoiseKind::Gaussian => {
            let dist = Normal::new(0.0, scale).map_err(|e| distribution_error(kind, e))?;
            add_sampled(image, &dist, rng)
        }
        NoiseKind::Rayleigh => {
            // Weibull with shape 2 and scale σ√2 is Rayleigh(σ)
            let dist = Weibull::new(scale * std::f64::consts::SQRT_2, 2.0)
                .map_err(|e| distribution_error(kind, e))?;
            add_sampled(image, &dist, rng)
        }
        NoiseKind::Erlang => {
            let dist = Gamma::new(ERLANG_SHAPE, scale).map_err(|e| distribution_error(kind, e))?;
            add_sampled(image, &dist, rng)
        }
        NoiseKind::Exponential => {
            let dist = Exp::new(1.0 / scale).map_err(|e| distribution_error(kind, e))?;
            add_sampled(image, &dist, rng)
        }
        NoiseKind::Uniform => {
            let dist = Uniform::new(-scale, scale).map_err(|e| distribution_error(kind, e))?;
            add_sampled(image, &dist, rng)
        }
    };

    Ok(noisy)
}

/// [`add_noise`] with a `StdRng` seeded from `seed`.
pub fn add_noise_seeded(
    image: &ImageMatrix,
    kind: NoiseKind,
    scale: f64,
    seed: u64,
) -> EngineResult<ImageMatrix> {
    let mut rng = StdRng::seed_from_u64(seed);
    add_noise(image, kind, scale, &mut rng)
}

// ============================================================================
// Impulse Noise
// ============================================================================

/// Salt-and-pepper noise with total probability `p`.
///
/// Each pixel gets two independent uniform draws. The first below `p / 2`
/// sets the pixel to 255 (salt), the second below `p / 2` sets it to 0
/// (pepper). Pepper is applied after salt, so it wins when both hit.
/// All channels of a hit pixel are set.
///
/// # Arguments
/// * `image` - Grayscale or RGB image
/// * `p` - Probability in [0, 0.5]; 0 returns an exact copy
/// * `rng` - Random source
pub fn salt_and_pepper<R: Rng + ?Sized>(
    image: &ImageMatrix,
    p: f64,
    rng: &mut R,
) -> EngineResult<ImageMatrix> {
    let p = ensure_range("impulse probability", p, 0.0, 0.5)?;
    if p == 0.0 {
        return Ok(image.clone());
    }
    trace!(p, "impulse noise");

    let half = p / 2.0;
    let mut data = image.as_array().clone();
    let (height, width, channels) = data.dim();

    for y in 0..height {
        for x in 0..width {
            let salt = rng.random::<f64>() < half;
            let pepper = rng.random::<f64>() < half;
            if salt {
                for c in 0..channels {
                    data[[y, x, c]] = 255;
                }
            }
            if pepper {
                for c in 0..channels {
                    data[[y, x, c]] = 0;
                }
            }
        }
    }

    Ok(ImageMatrix::from_array_unchecked(data))
}

/// [`salt_and_pepper`] with a `StdRng` seeded from `seed`.
pub fn salt_and_pepper_seeded(image: &ImageMatrix, p: f64, seed: u64) -> EngineResult<ImageMatrix> {
    let mut rng = StdRng::seed_from_u64(seed);
    salt_and_pepper(image, p, &mut rng)
}
